//! Taxonomic abundance aggregation and Control vs UC comparison
//!
//! This library turns a Kraken2-style abundance matrix (one row per
//! `|`-delimited taxonomy path, one column per sample) into per-rank level
//! tables and group statistics for ulcerative colitis studies.
//!
//! # Overview
//!
//! - **taxonomy**: Path grammar, ranks and name cleaning
//! - **data**: Core data structures (AbundanceMatrix, SampleMetadata, ComparisonTable)
//! - **levels**: Per-depth level tables and their files
//! - **group**: Control / UC assignment from metadata labels
//! - **normalize**: Reads-per-million normalization
//! - **diversity**: Shannon diversity per sample and group
//! - **compare**: Ratio engine, rankings and heatmap data
//! - **summarize**: Natural-language explanations with template fallback
//! - **export**: Krona text inputs
//! - **query**: Per-request entry points returning success/data/error
//!
//! # Example
//!
//! ```no_run
//! use taxa_contrast::prelude::*;
//!
//! let config = AnalysisConfig::new("abundance.tsv", "metadata.tsv");
//! let analyzer = Analyzer::new(config);
//!
//! analyzer.split_levels().unwrap();
//! let table = analyzer.comparison(Rank::Genus).unwrap();
//! for stat in table.iter().take(5) {
//!     println!("{}\t{}", stat.taxon, stat.ratio_display());
//! }
//! ```

pub mod compare;
pub mod config;
pub mod data;
pub mod diversity;
pub mod error;
pub mod export;
pub mod group;
pub mod levels;
pub mod normalize;
pub mod query;
pub mod summarize;
pub mod taxonomy;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::compare::{
        compare_groups, compute_ratios, heatmap_data, most_distinct, HeatmapData,
        UnresolvedPolicy,
    };
    pub use crate::config::{AbundanceUnit, AnalysisConfig, OllamaConfig};
    pub use crate::data::{AbundanceMatrix, ComparisonTable, SampleMetadata, TaxonStat};
    pub use crate::diversity::{group_diversity, shannon_index, DiversityPlotData};
    pub use crate::error::{Result, TaxaError};
    pub use crate::export::write_krona_inputs;
    pub use crate::group::{assign_group, Group, GroupPartition};
    pub use crate::levels::{build_level_table, build_level_tables, write_level_tables, LevelTable};
    pub use crate::normalize::{to_rpm, RpmMatrix};
    pub use crate::query::{get_comparison, get_data, get_taxa, Analyzer, Outcome, TaxonData};
    pub use crate::summarize::{
        explain, OfflineSummarizer, ReportType, Summarizer, SummaryRequest,
    };
    pub use crate::taxonomy::Rank;
}
