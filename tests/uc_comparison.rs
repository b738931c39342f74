//! Integration tests for level splitting and the Control vs UC comparison.

use approx::assert_relative_eq;
use std::fs;
use std::path::Path;
use taxa_contrast::prelude::*;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Two phyla under one kingdom, one control and two UC samples.
fn scenario(dir: &Path) -> AnalysisConfig {
    let abundance = write(
        dir,
        "kraken.tsv",
        "ID\tc1\tu1\tu2\n\
         k__A|p__X\t10\t0\t20\n\
         k__A|p__Y\t0\t5\t5\n",
    );
    let metadata = write(
        dir,
        "metadata.tsv",
        "sample\tgroup\n\
         c1\tControl\n\
         u1\tUC\n\
         u2\tUC\n",
    );
    AnalysisConfig::new(abundance, metadata)
}

#[test]
fn test_level_tables_first_seen_row_wins() {
    let dir = TempDir::new().unwrap();
    let config = scenario(dir.path());
    let matrix = AbundanceMatrix::from_tsv(&config.abundance).unwrap();
    let tables = build_level_tables(&matrix).unwrap();

    assert_eq!(tables.len(), 2);
    let kingdom = &tables[&1].matrix;
    assert_eq!(kingdom.taxa(), &["k__A".to_string()]);
    assert_eq!(kingdom.row_dense(0), vec![10.0, 0.0, 20.0]);
    assert_eq!(tables[&2].matrix.n_taxa(), 2);
    assert_eq!(tables[&2].rank(), Some(Rank::Phylum));
}

#[test]
fn test_raw_comparison_scenario() {
    let dir = TempDir::new().unwrap();
    let mut config = scenario(dir.path());
    config.unit = AbundanceUnit::Raw;

    let table = Analyzer::new(config).comparison(Rank::Phylum).unwrap();
    assert_eq!(table.len(), 2);

    let x = table.iter().find(|s| s.taxon == "X").unwrap();
    assert_relative_eq!(x.control_avg, 10.0);
    assert_relative_eq!(x.uc_avg, 10.0);
    assert_relative_eq!(x.control_uc_ratio, 1.0);
    assert_relative_eq!(x.uc_std, 200.0_f64.sqrt(), epsilon = 1e-9);
    assert_eq!(x.control_samples, 1);
    assert_eq!(x.uc_samples, 2);

    let y = table.iter().find(|s| s.taxon == "Y").unwrap();
    assert_relative_eq!(y.control_uc_ratio, 0.0);
    assert_eq!(table.stats[0].taxon, "X");
}

#[test]
fn test_split_levels_files() {
    let dir = TempDir::new().unwrap();
    let config = scenario(dir.path());
    let written = Analyzer::new(config).split_levels().unwrap();

    assert_eq!(written.len(), 2);
    let level2 = fs::read_to_string(dir.path().join("kraken_level_2.tsv")).unwrap();
    let mut lines = level2.lines();
    assert_eq!(lines.next(), Some("Taxa\tc1\tu1\tu2"));
    assert!(lines.next().unwrap().starts_with("k__A|p__X\t"));
}

#[test]
fn test_control_only_taxon_sorts_first() {
    let dir = TempDir::new().unwrap();
    let abundance = write(
        dir.path(),
        "kraken.tsv",
        "ID\tc1\tu1\n\
         k__B|p__Shared\t4\t2\n\
         k__B|p__ControlOnly\t3\t0\n\
         k__B|p__Absent\t0\t0\n",
    );
    let metadata = write(dir.path(), "metadata.tsv", "sample\tgroup\nc1\thealthy control\nu1\tUC\n");
    let mut config = AnalysisConfig::new(abundance, metadata);
    config.unit = AbundanceUnit::Raw;

    let table = Analyzer::new(config).comparison(Rank::Phylum).unwrap();
    let order: Vec<&str> = table.iter().map(|s| s.taxon.as_str()).collect();
    assert_eq!(order, vec!["ControlOnly", "Shared", "Absent"]);
    assert!(table.stats[0].control_uc_ratio.is_infinite());

    let tsv = table.to_tsv_string().unwrap();
    assert!(tsv.starts_with(
        "Taxon\tControl_Average\tUC_Average\tUC_StdDev\tControl_UC_Ratio\tControl_Samples\tUC_Samples"
    ));
    assert!(tsv.contains("ControlOnly\t3.000000\t0.000000\t0.000000\tInf\t1\t1"));
}

#[test]
fn test_unknown_label_is_uc() {
    let metadata = SampleMetadata::new()
        .with_sample("s1", "Control", None)
        .with_sample("s2", "Unknown", None)
        .with_sample("s3", "", None);
    assert_eq!(assign_group("s1", &metadata), Group::Control);
    assert_eq!(assign_group("s2", &metadata), Group::Uc);
    assert_eq!(assign_group("s3", &metadata), Group::Uc);
    assert_eq!(assign_group("missing", &metadata), Group::Uc);
}

#[test]
fn test_rpm_columns_sum_to_a_million() {
    let matrix = AbundanceMatrix::from_rows(
        vec!["k__A|p__X".into(), "k__A|p__Y".into()],
        vec!["a".into(), "b".into()],
        &[vec![3.0, 0.0], vec![1.0, 0.0]],
    )
    .unwrap();
    let rpm = to_rpm(&matrix);
    let col_a: f64 = rpm.col(0).iter().sum();
    assert_relative_eq!(col_a, 1_000_000.0, epsilon = 1e-6);
    assert!(rpm.col(1).iter().all(|v| *v == 0.0));
}

#[test]
fn test_entry_points_report_success() {
    let dir = TempDir::new().unwrap();
    let config = scenario(dir.path());

    let taxa = get_taxa(&config, "phylum");
    assert!(taxa.success);
    assert_eq!(taxa.data.unwrap(), vec!["X", "Y"]);

    let data = get_data(&config, "2", "X");
    assert!(data.success);
    let data = data.data.unwrap().unwrap();
    assert_eq!(data.sample_names, vec!["c1", "u1", "u2"]);
    // Column sums of the phylum table: 10, 5, 25
    assert_relative_eq!(data.control, 1_000_000.0, epsilon = 1e-6);
    assert_relative_eq!(data.uc_mean, 400_000.0, epsilon = 1e-6);

    let json = serde_json::to_value(get_taxa(&config, "kingdom")).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"][0], "A");
}

#[test]
fn test_missing_files_are_empty_not_errors() {
    let dir = TempDir::new().unwrap();
    let config = AnalysisConfig::new(dir.path().join("absent.tsv"), dir.path().join("meta.tsv"));

    let taxa = get_taxa(&config, "genus");
    assert!(taxa.success);
    assert!(taxa.data.unwrap().is_empty());

    let data = get_data(&config, "genus", "Bacteroides");
    assert!(data.success);
    assert_eq!(data.data, Some(None));
}

#[test]
fn test_explanation_falls_back_offline() {
    let dir = TempDir::new().unwrap();
    let config = scenario(dir.path());
    let analyzer = Analyzer::new(config);

    let text = analyzer
        .explain_comparison(Rank::Phylum, ReportType::Technical, &OfflineSummarizer)
        .unwrap();
    assert!(!text.trim().is_empty());
}
