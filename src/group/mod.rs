//! Control / UC group assignment from sample metadata.
//!
//! A sample is a control when its group label contains `control` in any
//! case. Every other sample, including ones labelled `Unknown` and ones that
//! are absent from the metadata, counts as UC.

use crate::data::SampleMetadata;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn control_regex() -> &'static Regex {
    static CONTROL: OnceLock<Regex> = OnceLock::new();
    CONTROL.get_or_init(|| Regex::new(r"(?i)control").unwrap())
}

/// Study group of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Control,
    Uc,
}

impl Group {
    /// Lowercase key, `control` or `uc`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Uc => "uc",
        }
    }

    /// Display label used in plots.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Control => "Control",
            Self::Uc => "UC",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Classify a group label.
pub fn classify_label(label: &str) -> Group {
    if control_regex().is_match(label) {
        Group::Control
    } else {
        Group::Uc
    }
}

/// Assign a sample to its group.
pub fn assign_group(sample_id: &str, metadata: &SampleMetadata) -> Group {
    match metadata.group_label(sample_id) {
        Some(label) => classify_label(label),
        None => {
            log::debug!("Sample '{}' has no metadata, assigning to UC", sample_id);
            Group::Uc
        }
    }
}

/// Column indices of a matrix split by group, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPartition {
    pub control: Vec<usize>,
    pub uc: Vec<usize>,
}

impl GroupPartition {
    /// Partition sample columns using the metadata.
    pub fn from_samples(sample_ids: &[String], metadata: &SampleMetadata) -> Self {
        let mut partition = Self::default();
        for (idx, sample_id) in sample_ids.iter().enumerate() {
            match assign_group(sample_id, metadata) {
                Group::Control => partition.control.push(idx),
                Group::Uc => partition.uc.push(idx),
            }
        }
        partition
    }

    /// Indices for one group.
    pub fn indices(&self, group: Group) -> &[usize] {
        match group {
            Group::Control => &self.control,
            Group::Uc => &self.uc,
        }
    }

    /// Pick the values belonging to one group out of a dense row.
    pub fn select(&self, group: Group, row: &[f64]) -> Vec<f64> {
        self.indices(group)
            .iter()
            .filter_map(|&idx| row.get(idx).copied())
            .collect()
    }
}
