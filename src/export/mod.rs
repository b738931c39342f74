//! File exports for external visualisation tools.

pub mod krona;

pub use krona::{krona_lines, write_krona_inputs};
