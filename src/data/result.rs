//! Per-taxon comparison records and the comparison table built from them.

use crate::error::Result;
use crate::taxonomy::Rank;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column headers shared by the TSV and spreadsheet exports.
pub const COMPARISON_HEADER: [&str; 7] = [
    "Taxon",
    "Control_Average",
    "UC_Average",
    "UC_StdDev",
    "Control_UC_Ratio",
    "Control_Samples",
    "UC_Samples",
];

/// Control vs UC statistics for one taxon at one rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonStat {
    /// Rank-specific name, prefix stripped and underscores replaced by spaces.
    pub taxon: String,
    /// Mean abundance over control samples.
    pub control_avg: f64,
    /// Mean abundance over UC samples.
    pub uc_avg: f64,
    /// Sample standard deviation over UC samples.
    pub uc_std: f64,
    /// `control_avg / uc_avg`, `+inf` when only the control side is present.
    /// Serialized as `"Inf"` in that case, as in the TSV export.
    #[serde(with = "ratio_serde")]
    pub control_uc_ratio: f64,
    /// Number of control samples contributing.
    pub control_samples: usize,
    /// Number of UC samples contributing.
    pub uc_samples: usize,
}

impl TaxonStat {
    /// Whether the taxon was seen in controls but never in UC samples.
    pub fn is_control_only(&self) -> bool {
        self.control_uc_ratio.is_infinite()
    }

    /// Ratio formatted for tables: six decimals or `Inf`.
    pub fn ratio_display(&self) -> String {
        format_ratio(self.control_uc_ratio, 6)
    }

    /// Distance of the ratio from 1, with control-only taxa scored as 0.
    pub fn effect_size(&self) -> f64 {
        if self.control_uc_ratio.is_infinite() {
            0.0
        } else {
            (self.control_uc_ratio - 1.0).abs()
        }
    }

    fn cells(&self) -> [String; 7] {
        [
            self.taxon.clone(),
            format!("{:.6}", self.control_avg),
            format!("{:.6}", self.uc_avg),
            format!("{:.6}", self.uc_std),
            self.ratio_display(),
            self.control_samples.to_string(),
            self.uc_samples.to_string(),
        ]
    }
}

/// Format a ratio with the given precision, printing infinity as `Inf`.
pub fn format_ratio(ratio: f64, precision: usize) -> String {
    if ratio.is_infinite() {
        "Inf".to_string()
    } else {
        format!("{:.*}", precision, ratio)
    }
}

/// JSON has no infinity, so infinite ratios travel as the string `"Inf"`.
mod ratio_serde {
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    pub fn serialize<S: Serializer>(ratio: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if ratio.is_infinite() && *ratio > 0.0 {
            serializer.serialize_str("Inf")
        } else {
            serializer.serialize_f64(*ratio)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRatio {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match RawRatio::deserialize(deserializer)? {
            RawRatio::Number(v) => Ok(v),
            RawRatio::Text(t) if t.eq_ignore_ascii_case("inf") => Ok(f64::INFINITY),
            RawRatio::Text(t) => t
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("invalid ratio '{}'", t))),
        }
    }
}

/// Ordered comparison statistics for one rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonTable {
    /// Rank the statistics were computed at.
    pub rank: Rank,
    /// Records, already sorted by the ratio engine.
    pub stats: Vec<TaxonStat>,
}

impl ComparisonTable {
    /// Create a new table.
    pub fn new(rank: Rank, stats: Vec<TaxonStat>) -> Self {
        Self { rank, stats }
    }

    /// Number of taxa.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Iterate over records.
    pub fn iter(&self) -> impl Iterator<Item = &TaxonStat> {
        self.stats.iter()
    }

    /// Conventional download name, e.g. `taxa_comparison_family.tsv`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("taxa_comparison_{}.{}", self.rank.name(), extension)
    }

    /// Write the table as TSV to any writer.
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "{}", COMPARISON_HEADER.join("\t"))?;
        for stat in &self.stats {
            writeln!(writer, "{}", stat.cells().join("\t"))?;
        }
        Ok(())
    }

    /// Render the table as a TSV string.
    pub fn to_tsv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_tsv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the table to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_tsv(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the spreadsheet export (same columns, comma separated).
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(COMPARISON_HEADER)?;
        for stat in &self.stats {
            csv_writer.write_record(stat.cells())?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the spreadsheet export to a file.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }

    /// Auto-sized column widths in characters for spreadsheet renderers:
    /// the longest cell (header included) plus two, capped at 50.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = COMPARISON_HEADER.iter().map(|h| h.chars().count()).collect();
        for stat in &self.stats {
            for (width, cell) in widths.iter_mut().zip(stat.cells().iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths.into_iter().map(|w| (w + 2).min(50)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(taxon: &str, control_avg: f64, uc_avg: f64, ratio: f64) -> TaxonStat {
        TaxonStat {
            taxon: taxon.to_string(),
            control_avg,
            uc_avg,
            uc_std: 0.5,
            control_uc_ratio: ratio,
            control_samples: 1,
            uc_samples: 3,
        }
    }

    fn sample_table() -> ComparisonTable {
        ComparisonTable::new(
            Rank::Family,
            vec![
                stat("Acetobacteraceae", 4.0, 0.0, f64::INFINITY),
                stat("Bacteroidaceae", 2.0, 1.0, 2.0),
            ],
        )
    }

    #[test]
    fn test_tsv_output() {
        let tsv = sample_table().to_tsv_string().unwrap();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(
            lines[0],
            "Taxon\tControl_Average\tUC_Average\tUC_StdDev\tControl_UC_Ratio\tControl_Samples\tUC_Samples"
        );
        assert_eq!(
            lines[1],
            "Acetobacteraceae\t4.000000\t0.000000\t0.500000\tInf\t1\t3"
        );
        assert_eq!(lines[2], "Bacteroidaceae\t2.000000\t1.000000\t0.500000\t2.000000\t1\t3");
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        sample_table().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Taxon,Control_Average,"));
        assert!(text.contains("Acetobacteraceae,4.000000,0.000000,0.500000,Inf,1,3"));
    }

    #[test]
    fn test_column_widths() {
        let widths = sample_table().column_widths();
        assert_eq!(widths.len(), 7);
        assert_eq!(widths[0], "Acetobacteraceae".len() + 2);
        assert_eq!(widths[1], "Control_Average".len() + 2);
    }

    #[test]
    fn test_infinite_ratio_json_roundtrip() {
        let table = sample_table();
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains(r#""control_uc_ratio":"Inf""#));
        assert!(json.contains(r#""control_uc_ratio":2.0"#));

        let back: ComparisonTable = serde_json::from_str(&json).unwrap();
        assert!(back.stats[0].is_control_only());
        assert_eq!(back.stats[1].control_uc_ratio, 2.0);
        assert!(serde_json::from_str::<TaxonStat>(
            r#"{"taxon":"x","control_avg":1.0,"uc_avg":0.0,"uc_std":0.0,"control_uc_ratio":"bad","control_samples":1,"uc_samples":0}"#
        )
        .is_err());
    }

    #[test]
    fn test_effect_size() {
        assert_eq!(stat("a", 1.0, 0.0, f64::INFINITY).effect_size(), 0.0);
        assert_eq!(stat("b", 1.0, 4.0, 0.25).effect_size(), 0.75);
        assert_eq!(sample_table().file_name("tsv"), "taxa_comparison_family.tsv");
    }
}
