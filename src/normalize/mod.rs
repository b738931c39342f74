//! Sequencing-depth normalization.

pub mod rpm;

pub use rpm::{to_rpm, RpmMatrix, RPM_SCALE};
