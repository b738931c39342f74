//! Per-request analysis service over the study's input files.

use super::Outcome;
use crate::compare::{compare_groups, heatmap_data, most_distinct, HeatmapData};
use crate::config::{AbundanceUnit, AnalysisConfig};
use crate::data::{AbundanceMatrix, ComparisonTable, SampleMetadata};
use crate::diversity::{group_diversity, DiversityPlotData};
use crate::error::{Result, TaxaError};
use crate::export::write_krona_inputs;
use crate::group::{Group, GroupPartition};
use crate::levels::{self, LevelTable};
use crate::normalize::to_rpm;
use crate::summarize::{
    explain, ComparisonSummary, DiversityPlotSummary, ReportType, StackedPlotSummary, Summarizer,
    SummaryRequest, TaxonPlotSummary,
};
use crate::taxonomy::{self, Rank};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// RPM values of one taxon, split by group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonData {
    pub taxon: String,
    pub sample_names: Vec<String>,
    /// Per-sample RPM, aligned with `sample_names`.
    pub rpm_values: Vec<f64>,
    /// Mean RPM over control samples.
    pub control: f64,
    pub uc_samples: Vec<f64>,
    pub uc_mean: f64,
}

impl TaxonData {
    pub fn plot_summary(&self) -> TaxonPlotSummary {
        TaxonPlotSummary {
            taxon: self.taxon.clone(),
            sample_names: self.sample_names.clone(),
            rpm_values: self.rpm_values.clone(),
            control_avg: self.control,
            uc_avg: self.uc_mean,
        }
    }
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().mean()
    }
}

/// Reads the configured files fresh on every call and keeps no state
/// besides the configuration. Build one per request.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Level table for a rank: the level file when present, otherwise
    /// derived from the full abundance matrix. `None` when neither exists.
    pub fn level_table(&self, rank: Rank) -> Result<Option<LevelTable>> {
        let path = self.config.level_file(rank.depth());
        if path.exists() {
            log::debug!("Reading {}", path.display());
            return LevelTable::from_tsv(&path, rank.depth()).map(Some);
        }
        if self.config.abundance.exists() {
            log::debug!(
                "{} missing, deriving from {}",
                path.display(),
                self.config.abundance.display()
            );
            let matrix = AbundanceMatrix::from_tsv(&self.config.abundance)?;
            return levels::build_level_table(&matrix, rank.depth()).map(Some);
        }
        log::warn!("No level data for {} ({} not found)", rank, path.display());
        Ok(None)
    }

    /// Sample metadata. A missing file yields empty metadata, so every
    /// sample counts as UC.
    pub fn metadata(&self) -> Result<SampleMetadata> {
        if !self.config.metadata.exists() {
            log::warn!(
                "Metadata {} not found, treating all samples as UC",
                self.config.metadata.display()
            );
            return Ok(SampleMetadata::new());
        }
        SampleMetadata::from_tsv(&self.config.metadata)
    }

    /// Level table in the configured unit, ready for the ratio engine.
    fn comparison_input(&self, table: &LevelTable) -> Result<AbundanceMatrix> {
        match self.config.unit {
            AbundanceUnit::Raw => Ok(table.matrix.clone()),
            AbundanceUnit::Rpm => to_rpm(&table.matrix).to_abundance(levels::LEVEL_INDEX),
        }
    }

    /// Sorted unique taxon names at a rank; empty when no data exists.
    pub fn get_taxa(&self, rank: Rank) -> Result<Vec<String>> {
        let Some(table) = self.level_table(rank)? else {
            return Ok(Vec::new());
        };
        let names: BTreeSet<String> = table
            .matrix
            .taxa()
            .iter()
            .filter_map(|path| taxonomy::rank_name(path, rank))
            .collect();
        Ok(names.into_iter().collect())
    }

    /// RPM values of one taxon. `None` when no data exists for the rank.
    ///
    /// `taxon` may be given cleaned (`Bacteroides fragilis`) or raw
    /// (`Bacteroides_fragilis`); the first matching row is used.
    pub fn get_data(&self, rank: Rank, taxon: &str) -> Result<Option<TaxonData>> {
        let Some(table) = self.level_table(rank)? else {
            return Ok(None);
        };
        let wanted = taxon.trim().replace('_', " ");
        let row = table
            .matrix
            .taxa()
            .iter()
            .position(|path| taxonomy::rank_name(path, rank).as_deref() == Some(wanted.as_str()))
            .ok_or_else(|| TaxaError::TaxonNotFound {
                taxon: taxon.to_string(),
                rank: rank.to_string(),
            })?;

        let metadata = self.metadata()?;
        let rpm = to_rpm(&table.matrix);
        let rpm_values = rpm.row(row);
        let partition = GroupPartition::from_samples(&rpm.sample_ids, &metadata);
        let control = partition.select(Group::Control, &rpm_values);
        let uc_samples = partition.select(Group::Uc, &rpm_values);

        Ok(Some(TaxonData {
            taxon: wanted,
            sample_names: rpm.sample_ids.clone(),
            control: mean_or_zero(&control),
            uc_mean: mean_or_zero(&uc_samples),
            uc_samples,
            rpm_values,
        }))
    }

    /// Control / UC statistics at a rank; empty when no data exists.
    pub fn comparison(&self, rank: Rank) -> Result<ComparisonTable> {
        let Some(table) = self.level_table(rank)? else {
            return Ok(ComparisonTable::new(rank, Vec::new()));
        };
        let metadata = self.metadata()?;
        let input = self.comparison_input(&table)?;
        Ok(compare_groups(&input, &metadata, rank, self.config.policy))
    }

    /// Comparison rendered as TSV.
    pub fn comparison_tsv(&self, rank: Rank) -> Result<String> {
        self.comparison(rank)?.to_tsv_string()
    }

    /// Heatmap of the most distinct taxa.
    pub fn heatmap(&self, rank: Rank) -> Result<HeatmapData> {
        let table = self.comparison(rank)?;
        Ok(heatmap_data(&table.stats, self.config.top_n, self.config.inf_display))
    }

    /// Shannon diversity per group at a rank. `None` when no data exists.
    pub fn diversity(&self, rank: Rank) -> Result<Option<DiversityPlotData>> {
        let Some(table) = self.level_table(rank)? else {
            return Ok(None);
        };
        let metadata = self.metadata()?;
        Ok(Some(group_diversity(&table.matrix, &metadata)))
    }

    /// Numeric summary of a rank for report text.
    pub fn comparison_summary(&self, rank: Rank, report_type: ReportType) -> Result<SummaryRequest> {
        let table = self.comparison(rank)?;
        Ok(SummaryRequest::GroupComparison(ComparisonSummary {
            rank,
            report_type,
            n_taxa: table.len(),
            top: most_distinct(&table.stats, self.config.top_n),
            diversity: self.diversity(rank)?,
        }))
    }

    /// Report text for a rank, template text if the service fails.
    pub fn explain_comparison(
        &self,
        rank: Rank,
        report_type: ReportType,
        summarizer: &dyn Summarizer,
    ) -> Result<String> {
        let request = self.comparison_summary(rank, report_type)?;
        Ok(explain(summarizer, &request))
    }

    /// Explanation of one taxon's plot. `None` when no data exists.
    pub fn explain_taxon(
        &self,
        rank: Rank,
        taxon: &str,
        summarizer: &dyn Summarizer,
    ) -> Result<Option<String>> {
        Ok(self
            .get_data(rank, taxon)?
            .map(|data| explain(summarizer, &SummaryRequest::TaxonPlot(data.plot_summary()))))
    }

    /// Explanation of a rank's diversity plot. `None` when no data exists.
    pub fn explain_diversity(&self, rank: Rank, summarizer: &dyn Summarizer) -> Result<Option<String>> {
        Ok(self.diversity(rank)?.map(|plot| {
            let request = SummaryRequest::DiversityPlot(DiversityPlotSummary::from_plot("shannon", &plot));
            explain(summarizer, &request)
        }))
    }

    /// Composition of the `top_n` most abundant taxa at a rank, by mean RPM.
    /// `None` when no data exists.
    pub fn stacked_summary(&self, rank: Rank) -> Result<Option<StackedPlotSummary>> {
        let Some(table) = self.level_table(rank)? else {
            return Ok(None);
        };
        let rpm = to_rpm(&table.matrix);

        let mut ranked: Vec<(String, Vec<f64>, f64)> = Vec::new();
        for (row, path) in rpm.taxa.iter().enumerate() {
            let Some(name) = taxonomy::rank_name(path, rank) else {
                continue;
            };
            if ranked.iter().any(|(seen, _, _)| *seen == name) {
                continue;
            }
            let values = rpm.row(row);
            let mean = mean_or_zero(&values);
            ranked.push((name, values, mean));
        }
        ranked.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
        ranked.truncate(self.config.top_n);

        let top_taxa = ranked.iter().map(|(name, _, _)| name.clone()).collect();
        let abundances = ranked
            .into_iter()
            .map(|(name, values, _)| (name, values))
            .collect();
        Ok(Some(StackedPlotSummary {
            plot_type: "stacked".to_string(),
            top_taxa,
            abundances,
        }))
    }

    /// Explanation of a rank's stacked composition plot. `None` when no data exists.
    pub fn explain_stacked(&self, rank: Rank, summarizer: &dyn Summarizer) -> Result<Option<String>> {
        Ok(self
            .stacked_summary(rank)?
            .map(|summary| explain(summarizer, &SummaryRequest::StackedPlot(summary))))
    }

    /// Split the abundance matrix into level files under the level base.
    pub fn split_levels(&self) -> Result<Vec<PathBuf>> {
        let matrix = AbundanceMatrix::from_tsv(&self.config.abundance)?;
        let tables = levels::build_level_tables(&matrix)?;
        levels::write_level_tables(&tables, self.config.level_base())
    }

    /// Krona text inputs for every sample with an SRR accession.
    pub fn krona<P: AsRef<Path>>(&self, output_dir: P) -> Result<Vec<PathBuf>> {
        let matrix = AbundanceMatrix::from_tsv(&self.config.abundance)?;
        let metadata = self.metadata()?;
        write_krona_inputs(&matrix, &metadata, output_dir)
    }
}

/// `get_taxa` entry point.
pub fn get_taxa(config: &AnalysisConfig, rank: &str) -> Outcome<Vec<String>> {
    Outcome::capture(|| {
        let rank: Rank = rank.parse()?;
        Analyzer::new(config.clone()).get_taxa(rank)
    })
}

/// `get_data` entry point. Succeeds with no data when the rank has no file.
pub fn get_data(config: &AnalysisConfig, rank: &str, taxon: &str) -> Outcome<Option<TaxonData>> {
    Outcome::capture(|| {
        let rank: Rank = rank.parse()?;
        Analyzer::new(config.clone()).get_data(rank, taxon)
    })
}

/// Comparison table entry point.
pub fn get_comparison(config: &AnalysisConfig, rank: &str) -> Outcome<ComparisonTable> {
    Outcome::capture(|| {
        let rank: Rank = rank.parse()?;
        let table = Analyzer::new(config.clone()).comparison(rank)?;
        if table.is_empty() {
            return Err(TaxaError::EmptyData(format!(
                "No data available for the {} level",
                rank
            )));
        }
        Ok(table)
    })
}
