//! Numeric summaries handed to an explanation service.

use crate::data::TaxonStat;
use crate::diversity::DiversityPlotData;
use crate::taxonomy::Rank;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Audience of a comparison report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Plain language for patients.
    Lay,
    #[default]
    Technical,
}

impl ReportType {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Lay => "Lay Summary",
            Self::Technical => "Technical Summary",
        }
    }
}

/// One taxon's values across samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonPlotSummary {
    pub taxon: String,
    pub sample_names: Vec<String>,
    /// Per-sample RPM, aligned with `sample_names`.
    pub rpm_values: Vec<f64>,
    pub control_avg: f64,
    pub uc_avg: f64,
}

impl TaxonPlotSummary {
    /// Smallest and largest RPM, `(0, 0)` without samples.
    pub fn range(&self) -> (f64, f64) {
        if self.rpm_values.is_empty() {
            (0.0, 0.0)
        } else {
            (
                Statistics::min(self.rpm_values.iter()),
                Statistics::max(self.rpm_values.iter()),
            )
        }
    }
}

/// Diversity values of a plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityPlotSummary {
    /// Diversity measure shown, e.g. `shannon`.
    pub plot_type: String,
    pub values: Vec<(String, f64)>,
}

impl DiversityPlotSummary {
    pub fn from_plot(plot_type: &str, plot: &DiversityPlotData) -> Self {
        Self {
            plot_type: plot_type.to_string(),
            values: plot.per_sample.clone(),
        }
    }

    /// Mean diversity, 0 without samples.
    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.values.iter().map(|(_, v)| *v).mean()
        }
    }
}

/// Composition of a stacked bar plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedPlotSummary {
    pub plot_type: String,
    pub top_taxa: Vec<String>,
    /// Per-sample abundances of each top taxon.
    pub abundances: BTreeMap<String, Vec<f64>>,
}

/// Group comparison at one rank, for report summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub rank: Rank,
    pub report_type: ReportType,
    /// Total taxa compared at this rank.
    pub n_taxa: usize,
    /// Most distinct taxa, most distinct first.
    pub top: Vec<TaxonStat>,
    pub diversity: Option<DiversityPlotData>,
}

/// Everything an explanation can be requested for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryRequest {
    TaxonPlot(TaxonPlotSummary),
    DiversityPlot(DiversityPlotSummary),
    StackedPlot(StackedPlotSummary),
    GroupComparison(ComparisonSummary),
}
