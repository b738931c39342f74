//! Natural-language explanations of comparison results.
//!
//! Text generation sits behind the [`Summarizer`] trait. Any failure, or an
//! empty answer, falls back to a template built from the same numbers, so
//! nothing here needs a network to produce output.

mod fallback;
#[cfg(feature = "ollama")]
mod ollama;
mod request;

pub use fallback::{fallback_text, BALANCED_DIVERSITY};
#[cfg(feature = "ollama")]
pub use ollama::OllamaSummarizer;
pub use request::{
    ComparisonSummary, DiversityPlotSummary, ReportType, StackedPlotSummary, SummaryRequest,
    TaxonPlotSummary,
};

use crate::config::OllamaConfig;
use crate::error::{Result, TaxaError};

/// A text-generation capability.
pub trait Summarizer {
    /// Explain the numbers in `request`. May fail.
    fn summarize(&self, request: &SummaryRequest) -> Result<String>;
}

/// Summarizer that never answers, leaving every request to the templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSummarizer;

impl Summarizer for OfflineSummarizer {
    fn summarize(&self, _request: &SummaryRequest) -> Result<String> {
        Err(TaxaError::Summarizer("no explanation service configured".into()))
    }
}

/// Explanation from `summarizer`, or the template when it fails.
pub fn explain(summarizer: &dyn Summarizer, request: &SummaryRequest) -> String {
    match summarizer.summarize(request) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            log::warn!("Explanation service returned no text, using template");
            fallback_text(request)
        }
        Err(e) => {
            log::warn!("Explanation service failed ({}), using template", e);
            fallback_text(request)
        }
    }
}

/// Summarizer for the given settings.
///
/// Without the `ollama` feature this is always [`OfflineSummarizer`].
pub fn from_config(config: Option<&OllamaConfig>) -> Result<Box<dyn Summarizer>> {
    match config {
        #[cfg(feature = "ollama")]
        Some(cfg) => Ok(Box::new(OllamaSummarizer::new(cfg)?)),
        #[cfg(not(feature = "ollama"))]
        Some(_) => {
            log::info!("Built without the `ollama` feature, explanations use templates");
            Ok(Box::new(OfflineSummarizer))
        }
        None => Ok(Box::new(OfflineSummarizer)),
    }
}

const INSTRUCTIONS: &str = "Provide a personalized analysis that:\n\
1. Mentions the specific taxa or measures by name\n\
2. References the actual values below\n\
3. Compares control vs UC samples with specific numbers\n\
4. Explains what the differences might mean in simple terms\n\n\
Keep it under 150 words and focus on the data provided.";

/// Prompt for a language model, with the numbers embedded as JSON.
pub fn build_prompt(request: &SummaryRequest) -> Result<String> {
    let (role, subject) = match request {
        SummaryRequest::TaxonPlot(s) => {
            let (min, max) = s.range();
            (
                "explaining results to patients in simple terms",
                format!(
                    "TAXON: {}\nCONTROL AVERAGE: {:.3} RPM\nUC AVERAGE: {:.3} RPM\nRANGE: {:.3} to {:.3} RPM",
                    s.taxon, s.control_avg, s.uc_avg, min, max
                ),
            )
        }
        SummaryRequest::DiversityPlot(s) => (
            "explaining diversity results to patients in simple terms",
            format!(
                "PLOT TYPE: {}\nAVERAGE DIVERSITY: {:.3}",
                s.plot_type,
                s.average()
            ),
        ),
        SummaryRequest::StackedPlot(s) => (
            "explaining microbiome composition results to patients in simple terms",
            format!("PLOT TYPE: {}\nTOP TAXA: {}", s.plot_type, s.top_taxa.join(", ")),
        ),
        SummaryRequest::GroupComparison(s) => (
            match s.report_type {
                ReportType::Lay => "writing a lay summary of a Control vs UC study",
                ReportType::Technical => "writing a technical summary of a Control vs UC study",
            },
            format!("RANK: {}\nTAXA COMPARED: {}", s.rank, s.n_taxa),
        ),
    };

    let data = serde_json::to_string_pretty(request)?;
    Ok(format!(
        "You are a microbiome expert {}. Analyze this specific data:\n\n{}\nDATA: {}\n\n{}",
        role, subject, data, INSTRUCTIONS
    ))
}
