//! Error types for the taxa-contrast library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum TaxaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Missing column '{0}' in metadata")]
    MissingColumn(String),

    #[error("Unknown taxonomic rank '{0}'")]
    UnknownRank(String),

    #[error("Taxon '{taxon}' not found at {rank} level")]
    TaxonNotFound { taxon: String, rank: String },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Summarizer error: {0}")]
    Summarizer(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, TaxaError>;
