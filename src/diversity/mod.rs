//! Shannon diversity per sample and per study group.

use crate::data::{AbundanceMatrix, SampleMetadata};
use crate::group::{Group, GroupPartition};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Shannon diversity index, `-Σ p·ln(p)`, using the natural log.
///
/// Non-positive entries are ignored; an input with no positive entries
/// has diversity 0. Values are normalized to proportions first, so the
/// result does not depend on sequencing depth.
pub fn shannon_index(abundances: &[f64]) -> f64 {
    let positive: Vec<f64> = abundances.iter().copied().filter(|&x| x > 0.0).collect();
    let total: f64 = positive.iter().sum();
    if positive.is_empty() || total <= 0.0 {
        return 0.0;
    }

    let h: f64 = positive
        .iter()
        .map(|&x| {
            let p = x / total;
            p * p.ln()
        })
        .sum();
    // -0.0 for a single taxon
    (-h).max(0.0)
}

/// Shannon index of every sample column, in column order.
pub fn sample_diversity(matrix: &AbundanceMatrix) -> Vec<(String, f64)> {
    matrix
        .sample_ids()
        .iter()
        .enumerate()
        .map(|(col, sample)| (sample.clone(), shannon_index(&matrix.col_dense(col))))
        .collect()
}

/// Diversity comparison between groups, shaped for a bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityPlotData {
    /// Group labels, `Control` then `UC`.
    pub labels: Vec<String>,
    /// Mean per-sample Shannon index of each group (0 for an empty group).
    pub diversity_values: Vec<f64>,
    /// Number of samples in each group.
    pub sample_counts: Vec<usize>,
    /// Per-sample Shannon index, in column order.
    pub per_sample: Vec<(String, f64)>,
}

/// Mean Shannon diversity of the control and UC samples.
pub fn group_diversity(matrix: &AbundanceMatrix, metadata: &SampleMetadata) -> DiversityPlotData {
    let partition = GroupPartition::from_samples(matrix.sample_ids(), metadata);
    let per_sample = sample_diversity(matrix);
    let values: Vec<f64> = per_sample.iter().map(|(_, h)| *h).collect();

    let mut labels = Vec::new();
    let mut diversity_values = Vec::new();
    let mut sample_counts = Vec::new();
    for group in [Group::Control, Group::Uc] {
        let group_values = partition.select(group, &values);
        labels.push(group.label().to_string());
        sample_counts.push(group_values.len());
        diversity_values.push(if group_values.is_empty() {
            0.0
        } else {
            group_values.iter().mean()
        });
    }

    DiversityPlotData {
        labels,
        diversity_values,
        sample_counts,
        per_sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_is_ln_n() {
        assert_relative_eq!(shannon_index(&[5.0, 5.0, 5.0, 5.0]), 4f64.ln(), max_relative = 1e-9);
    }

    #[test]
    fn test_known_value() {
        // p = [0.5, 0.25, 0.25]
        let expected = -(0.5 * 0.5f64.ln() + 2.0 * 0.25 * 0.25f64.ln());
        assert_relative_eq!(shannon_index(&[2.0, 1.0, 1.0]), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(shannon_index(&[]), 0.0);
        assert_eq!(shannon_index(&[0.0, 0.0]), 0.0);
        assert_eq!(shannon_index(&[0.0, 7.0, -2.0]), 0.0);
        assert!(shannon_index(&[1.0, 1e-12]) > 0.0);
    }

    #[test]
    fn test_scale_invariance() {
        let base = [3.0, 1.0, 0.0, 9.0, 2.5];
        let scaled: Vec<f64> = base.iter().map(|x| x * 1234.5).collect();
        assert_relative_eq!(shannon_index(&base), shannon_index(&scaled), max_relative = 1e-9);
    }

    #[test]
    fn test_group_diversity() {
        let matrix = AbundanceMatrix::from_rows(
            vec!["a".into(), "b".into()],
            vec!["c1".into(), "u1".into(), "u2".into()],
            &[vec![1.0, 1.0, 5.0], vec![1.0, 0.0, 0.0]],
        )
        .unwrap();
        let meta = SampleMetadata::new()
            .with_sample("c1", "Control", None)
            .with_sample("u1", "UC", None)
            .with_sample("u2", "UC", None);

        let plot = group_diversity(&matrix, &meta);
        assert_eq!(plot.labels, vec!["Control", "UC"]);
        assert_eq!(plot.sample_counts, vec![1, 2]);
        assert_relative_eq!(plot.diversity_values[0], 2f64.ln(), max_relative = 1e-9);
        assert_eq!(plot.diversity_values[1], 0.0);
        assert_eq!(plot.per_sample.len(), 3);
    }
}
