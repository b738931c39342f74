//! Request-level entry points over the engine.

mod analyzer;
mod outcome;

pub use analyzer::{get_comparison, get_data, get_taxa, Analyzer, TaxonData};
pub use outcome::Outcome;
