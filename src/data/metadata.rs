//! Sample metadata: group labels and SRR accessions per sample.

use crate::error::{Result, TaxaError};
use std::collections::HashMap;
use std::path::Path;

/// Per-sample study metadata.
#[derive(Debug, Clone, Default)]
pub struct SampleMetadata {
    /// Sample IDs in file order.
    sample_ids: Vec<String>,
    /// Free-text group label per sample.
    groups: HashMap<String, String>,
    /// SRR accession per sample, when the table carries one.
    srr: HashMap<String, String>,
}

impl SampleMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sample entry.
    pub fn with_sample(mut self, sample_id: &str, group: &str, srr: Option<&str>) -> Self {
        self.insert(sample_id, group, srr);
        self
    }

    fn insert(&mut self, sample_id: &str, group: &str, srr: Option<&str>) {
        if !self.groups.contains_key(sample_id) {
            self.sample_ids.push(sample_id.to_string());
        }
        self.groups.insert(sample_id.to_string(), group.to_string());
        match srr.map(str::trim).filter(|s| !s.is_empty()) {
            Some(acc) => {
                self.srr.insert(sample_id.to_string(), acc.to_string());
            }
            None => {
                self.srr.remove(sample_id);
            }
        }
    }

    /// Load metadata from a TSV file.
    ///
    /// The header must contain `sample` and `group` columns (matched
    /// case-insensitively, in any position); an `srr` column is optional.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let headers = reader.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        };
        let sample_col = find("sample").ok_or_else(|| TaxaError::MissingColumn("sample".into()))?;
        let group_col = find("group").ok_or_else(|| TaxaError::MissingColumn("group".into()))?;
        let srr_col = find("srr");

        let mut metadata = Self::new();
        for record in reader.records() {
            let record = record?;
            let sample_id = match record.get(sample_col) {
                Some(s) if !s.is_empty() => s,
                _ => continue,
            };
            let group = record.get(group_col).unwrap_or("");
            let srr = srr_col.and_then(|c| record.get(c));
            metadata.insert(sample_id, group, srr);
        }

        log::debug!("Loaded metadata for {} samples", metadata.n_samples());
        Ok(metadata)
    }

    /// Sample IDs in order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Group label recorded for a sample.
    pub fn group_label(&self, sample_id: &str) -> Option<&str> {
        self.groups.get(sample_id).map(String::as_str)
    }

    /// SRR accession recorded for a sample.
    pub fn srr(&self, sample_id: &str) -> Option<&str> {
        self.srr.get(sample_id).map(String::as_str)
    }

    /// Check if a sample exists.
    pub fn has_sample(&self, sample_id: &str) -> bool {
        self.groups.contains_key(sample_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_metadata() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "srr\tSample\tGroup").unwrap();
        writeln!(file, "SRR15702647 \tPedUC47\tUC").unwrap();
        writeln!(file, "SRR15702659\tPedCtrl59\tControl").unwrap();
        writeln!(file, "\tPedX\tUnknown").unwrap();
        file.flush().unwrap();

        let meta = SampleMetadata::from_tsv(file.path()).unwrap();
        assert_eq!(meta.sample_ids(), &["PedUC47", "PedCtrl59", "PedX"]);
        assert_eq!(meta.group_label("PedCtrl59"), Some("Control"));
        assert_eq!(meta.srr("PedUC47"), Some("SRR15702647"));
        assert_eq!(meta.srr("PedX"), None);
        assert!(!meta.has_sample("PedUC99"));
    }

    #[test]
    fn test_missing_group_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sample\tcondition").unwrap();
        writeln!(file, "S1\tcontrol").unwrap();
        file.flush().unwrap();

        let err = SampleMetadata::from_tsv(file.path()).unwrap_err();
        assert!(matches!(err, TaxaError::MissingColumn(ref c) if c == "group"));
    }

    #[test]
    fn test_builder() {
        let meta = SampleMetadata::new()
            .with_sample("c1", "control", None)
            .with_sample("u1", "UC", Some("SRR1"))
            .with_sample("c1", "Control", None);
        assert_eq!(meta.n_samples(), 2);
        assert_eq!(meta.group_label("c1"), Some("Control"));
        assert_eq!(meta.srr("u1"), Some("SRR1"));
    }
}
