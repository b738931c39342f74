//! Ranked subsets and chart-ready records derived from comparison stats.

use crate::data::TaxonStat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of taxa shown in summary tables and heatmaps.
pub const DEFAULT_TOP_N: usize = 20;

/// Value drawn in place of an infinite ratio.
pub const DEFAULT_INF_DISPLAY: f64 = 10.0;

/// The `n` taxa whose ratio lies furthest from 1.
///
/// Control-only taxa (infinite ratio) score 0 here and sink to the bottom.
/// Ties keep their incoming order.
pub fn most_distinct(stats: &[TaxonStat], n: usize) -> Vec<TaxonStat> {
    let mut ranked: Vec<&TaxonStat> = stats.iter().collect();
    ranked.sort_by(|a, b| {
        b.effect_size()
            .partial_cmp(&a.effect_size())
            .unwrap_or(Ordering::Equal)
    });
    ranked.into_iter().take(n).cloned().collect()
}

/// Heatmap input: one entry per taxon in parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    pub taxa: Vec<String>,
    pub control_values: Vec<f64>,
    pub uc_values: Vec<f64>,
    /// Ratios with infinity replaced by the display value.
    pub ratios: Vec<f64>,
}

impl HeatmapData {
    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Each row scaled by its larger value, so both cells fall in [0, 1].
    pub fn row_normalized(&self) -> Vec<(f64, f64)> {
        self.control_values
            .iter()
            .zip(&self.uc_values)
            .map(|(&c, &u)| {
                let max = c.max(u);
                if max > 0.0 {
                    (c / max, u / max)
                } else {
                    (0.0, 0.0)
                }
            })
            .collect()
    }
}

/// Build heatmap data for the `n` most distinct taxa.
pub fn heatmap_data(stats: &[TaxonStat], n: usize, inf_display: f64) -> HeatmapData {
    let top = most_distinct(stats, n);
    HeatmapData {
        taxa: top.iter().map(|s| s.taxon.clone()).collect(),
        control_values: top.iter().map(|s| s.control_avg).collect(),
        uc_values: top.iter().map(|s| s.uc_avg).collect(),
        ratios: top
            .iter()
            .map(|s| {
                if s.control_uc_ratio.is_infinite() {
                    inf_display
                } else {
                    s.control_uc_ratio
                }
            })
            .collect(),
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
            uc_std: 0.0,
            control_uc_ratio: ratio,
            control_samples: 1,
            uc_samples: 2,
        }
    }

    fn stats() -> Vec<TaxonStat> {
        vec![
            stat("only_control", 5.0, 0.0, f64::INFINITY),
            stat("up", 6.0, 2.0, 3.0),
            stat("flat", 2.0, 2.0, 1.0),
            stat("down", 1.0, 10.0, 0.1),
        ]
    }

    #[test]
    fn test_most_distinct() {
        let top = most_distinct(&stats(), 3);
        let names: Vec<&str> = top.iter().map(|s| s.taxon.as_str()).collect();
        assert_eq!(names, vec!["up", "down", "only_control"]);
    }

    #[test]
    fn test_heatmap_clamps_infinity() {
        let heatmap = heatmap_data(&stats(), DEFAULT_TOP_N, DEFAULT_INF_DISPLAY);
        assert_eq!(heatmap.len(), 4);
        let idx = heatmap.taxa.iter().position(|t| t == "only_control").unwrap();
        assert_eq!(heatmap.ratios[idx], 10.0);
        assert!(heatmap.ratios.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn test_row_normalized() {
        let heatmap = heatmap_data(&[stat("a", 2.0, 8.0, 0.25), stat("z", 0.0, 0.0, 0.0)], 5, 10.0);
        assert_eq!(heatmap.row_normalized(), vec![(0.25, 1.0), (0.0, 0.0)]);
    }
}
