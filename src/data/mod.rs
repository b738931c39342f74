//! Data structures for taxonomic abundance comparison.

mod abundance_matrix;
mod metadata;
mod result;

pub use abundance_matrix::AbundanceMatrix;
pub use metadata::SampleMetadata;
pub use result::{format_ratio, ComparisonTable, TaxonStat, COMPARISON_HEADER};
