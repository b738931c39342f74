//! Fixed explanation templates used when no language model answers.

use super::request::{
    ComparisonSummary, DiversityPlotSummary, ReportType, StackedPlotSummary, SummaryRequest,
    TaxonPlotSummary,
};
use crate::data::format_ratio;

/// Shannon diversity above which a community is described as balanced.
pub const BALANCED_DIVERSITY: f64 = 3.0;

/// Template explanation built only from the numbers in the request.
pub fn fallback_text(request: &SummaryRequest) -> String {
    match request {
        SummaryRequest::TaxonPlot(s) => taxon_text(s),
        SummaryRequest::DiversityPlot(s) => diversity_text(s),
        SummaryRequest::StackedPlot(s) => stacked_text(s),
        SummaryRequest::GroupComparison(s) => comparison_text(s),
    }
}

fn taxon_text(s: &TaxonPlotSummary) -> String {
    let direction = if s.uc_avg > s.control_avg { "higher" } else { "lower" };
    format!(
        "This plot shows {taxon} abundance across your samples.\n\n\
         Control samples show an average of {c:.3} RPM, while UC samples show {u:.3} RPM.\n\n\
         The difference suggests {taxon} may be {direction} in your condition compared to \
         healthy controls. This could indicate changes in your gut microbiome that may be \
         related to your health status.\n\n\
         Consult with your healthcare provider about what these specific levels mean for \
         your individual case.",
        taxon = s.taxon,
        c = s.control_avg,
        u = s.uc_avg,
        direction = direction,
    )
}

fn diversity_text(s: &DiversityPlotSummary) -> String {
    let avg = s.average();
    let reading = if avg > BALANCED_DIVERSITY {
        "Higher diversity generally indicates a healthier, more balanced microbiome."
    } else {
        "Lower diversity may suggest your microbiome needs support to become more balanced."
    };
    format!(
        "This {plot} diversity plot shows how diverse your gut microbiome is across samples.\n\n\
         Your average diversity is {avg:.3}. {reading}\n\n\
         The specific values for each sample help identify which areas of your gut may need \
         attention. Discuss these results with your healthcare provider for personalized \
         recommendations.",
        plot = s.plot_type,
        avg = avg,
        reading = reading,
    )
}

fn stacked_text(s: &StackedPlotSummary) -> String {
    let top: Vec<&str> = s.top_taxa.iter().take(5).map(String::as_str).collect();
    format!(
        "This {plot} plot shows the composition of your gut microbiome, highlighting the most \
         abundant bacteria groups.\n\n\
         The top taxa in your samples include: {top}.\n\n\
         This visualization helps identify which bacteria are dominant in your gut and how \
         they compare between samples.\n\n\
         Discuss these specific results with your healthcare provider for personalized insights.",
        plot = s.plot_type,
        top = top.join(", "),
    )
}

fn comparison_text(s: &ComparisonSummary) -> String {
    let mut text = String::new();
    let rank = s.rank.name();

    match s.report_type {
        ReportType::Lay => text.push_str(&format!(
            "We compared {n} {rank}-level groups of gut bacteria between healthy control \
             samples and UC samples. ",
            n = s.n_taxa,
            rank = rank
        )),
        ReportType::Technical => text.push_str(&format!(
            "Control vs UC comparison at {rank} level: {n} taxa evaluated; ranked by \
             |Control/UC ratio - 1|. ",
            n = s.n_taxa,
            rank = rank
        )),
    }

    if let Some(div) = &s.diversity {
        let parts: Vec<String> = div
            .labels
            .iter()
            .zip(&div.diversity_values)
            .zip(&div.sample_counts)
            .map(|((label, value), n)| format!("{} {:.3} (n={})", label, value, n))
            .collect();
        text.push_str(&format!("Mean Shannon diversity: {}. ", parts.join(", ")));
    }

    if s.top.is_empty() {
        text.push_str("No taxa were available for comparison at this level.");
        return text;
    }

    let listed: Vec<String> = s
        .top
        .iter()
        .take(5)
        .map(|t| match s.report_type {
            ReportType::Lay if t.control_avg >= t.uc_avg => {
                format!("{} (more common in controls)", t.taxon)
            }
            ReportType::Lay => format!("{} (more common in UC)", t.taxon),
            ReportType::Technical => format!(
                "{} (control {:.4}, UC {:.4} ± {:.4}, ratio {})",
                t.taxon,
                t.control_avg,
                t.uc_avg,
                t.uc_std,
                format_ratio(t.control_uc_ratio, 2)
            ),
        })
        .collect();

    match s.report_type {
        ReportType::Lay => text.push_str(&format!(
            "The biggest differences were seen in {}. Discuss these results with your \
             healthcare provider.",
            listed.join(", ")
        )),
        ReportType::Technical => {
            text.push_str(&format!("Most distinct taxa: {}.", listed.join("; ")))
        }
    }
    text
}
