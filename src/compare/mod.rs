//! Group comparison: per-taxon Control / UC statistics and rankings.

mod plot;
mod ratio;

pub use plot::{heatmap_data, most_distinct, HeatmapData, DEFAULT_INF_DISPLAY, DEFAULT_TOP_N};
pub use ratio::{
    compare_groups, compute_ratios, control_uc_ratio, resolve_taxon, taxon_stat,
    UnresolvedPolicy,
};
