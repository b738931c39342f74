//! Taxon-by-sample abundance matrix with sparse storage.

use crate::error::{Result, TaxaError};
use sprs::{CsMat, TriMat};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A sparse matrix of taxon abundances across samples.
///
/// Rows are taxa keyed by their taxon path, columns are samples. Values are
/// non-negative read counts or normalized abundances. Uses CSR format since
/// Kraken2 tables are dominated by zeros and most access is row-wise.
#[derive(Debug, Clone)]
pub struct AbundanceMatrix {
    /// Sparse matrix in CSR format (taxa × samples)
    data: CsMat<f64>,
    /// Row keys (full or truncated taxon paths)
    taxa: Vec<String>,
    /// Sample identifiers (column names)
    sample_ids: Vec<String>,
    /// Header of the row-key column (`ID` for raw tables, `Taxa` for levels)
    index_name: String,
}

impl AbundanceMatrix {
    /// Create a new matrix from a sparse matrix and identifiers.
    pub fn new(data: CsMat<f64>, taxa: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != taxa.len() {
            return Err(TaxaError::DimensionMismatch {
                expected: nrows,
                actual: taxa.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(TaxaError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }
        Ok(Self {
            data,
            taxa,
            sample_ids,
            index_name: "ID".to_string(),
        })
    }

    /// Build from dense rows, one `Vec` per taxon.
    pub fn from_rows(
        taxa: Vec<String>,
        sample_ids: Vec<String>,
        rows: &[Vec<f64>],
    ) -> Result<Self> {
        if rows.len() != taxa.len() {
            return Err(TaxaError::DimensionMismatch {
                expected: taxa.len(),
                actual: rows.len(),
            });
        }
        let n_samples = sample_ids.len();
        let mut tri_mat = TriMat::new((taxa.len(), n_samples));
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != n_samples {
                return Err(TaxaError::DimensionMismatch {
                    expected: n_samples,
                    actual: row.len(),
                });
            }
            for (col_idx, &value) in row.iter().enumerate() {
                if value > 0.0 {
                    tri_mat.add_triplet(row_idx, col_idx, value);
                }
            }
        }
        Self::new(tri_mat.to_csr(), taxa, sample_ids)
    }

    /// Rename the row-key column used when writing TSV.
    pub fn with_index_name(mut self, name: &str) -> Self {
        self.index_name = name.to_string();
        self
    }

    /// Load an abundance matrix from a TSV file.
    ///
    /// Expected format:
    /// - First row: header with sample IDs (first column is the taxon key header)
    /// - Subsequent rows: taxon path followed by abundances
    ///
    /// Malformed, negative or missing cells are read as zero. A repeated
    /// taxon key keeps its first row.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        // Parse header
        let header_line = lines
            .next()
            .ok_or_else(|| TaxaError::EmptyData("Empty TSV file".to_string()))??;
        let header: Vec<&str> = header_line.trim_end_matches('\r').split('\t').collect();
        if header.len() < 2 {
            return Err(TaxaError::EmptyData(
                "TSV must have at least one sample".to_string(),
            ));
        }
        let index_name = header[0].trim().to_string();
        let sample_ids: Vec<String> = header[1..].iter().map(|s| s.trim().to_string()).collect();
        let n_samples = sample_ids.len();

        let mut triplets: Vec<(usize, usize, f64)> = Vec::new();
        let mut taxa: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (line_idx, line_result) in lines.enumerate() {
            let line = line_result?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let taxon = fields[0].trim().to_string();
            if !seen.insert(taxon.clone()) {
                log::warn!("Duplicate taxon '{}' on line {}, keeping first", taxon, line_idx + 2);
                continue;
            }

            let row_idx = taxa.len();
            taxa.push(taxon);
            for (col_idx, raw) in fields[1..].iter().take(n_samples).enumerate() {
                let value = parse_cell(raw, row_idx, col_idx);
                if value > 0.0 {
                    triplets.push((row_idx, col_idx, value));
                }
            }
        }

        let mut tri_mat = TriMat::new((taxa.len(), n_samples));
        for (row, col, val) in triplets {
            tri_mat.add_triplet(row, col, val);
        }

        log::debug!("Loaded {} taxa x {} samples", taxa.len(), n_samples);
        Ok(Self::new(tri_mat.to_csr(), taxa, sample_ids)?.with_index_name(&index_name))
    }

    /// Write the matrix to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_tsv(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the matrix as TSV to any writer.
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> Result<()> {
        write!(writer, "{}", self.index_name)?;
        for sample_id in &self.sample_ids {
            write!(writer, "\t{}", sample_id)?;
        }
        writeln!(writer)?;

        for (row_idx, taxon) in self.taxa.iter().enumerate() {
            write!(writer, "{}", taxon)?;
            for col_idx in 0..self.n_samples() {
                write!(writer, "\t{}", self.get(row_idx, col_idx))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Get the value at (row, col), returning 0 for missing entries.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data.get(row, col).copied().unwrap_or(0.0)
    }

    /// Number of taxa (rows).
    #[inline]
    pub fn n_taxa(&self) -> usize {
        self.taxa.len()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Whether the matrix has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Row keys.
    #[inline]
    pub fn taxa(&self) -> &[String] {
        &self.taxa
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Header of the row-key column.
    #[inline]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Get the underlying sparse matrix.
    #[inline]
    pub fn data(&self) -> &CsMat<f64> {
        &self.data
    }

    /// Index of the first row whose key equals `taxon`.
    pub fn position(&self, taxon: &str) -> Option<usize> {
        self.taxa.iter().position(|t| t == taxon)
    }

    /// Get a dense vector for a specific row (taxon).
    pub fn row_dense(&self, row: usize) -> Vec<f64> {
        let mut dense = vec![0.0; self.n_samples()];
        if let Some(row_vec) = self.data.outer_view(row) {
            for (col, &val) in row_vec.iter() {
                dense[col] = val;
            }
        }
        dense
    }

    /// Get a dense vector for a specific column (sample).
    pub fn col_dense(&self, col: usize) -> Vec<f64> {
        (0..self.n_taxa()).map(|row| self.get(row, col)).collect()
    }

    /// Compute column sums (library sizes per sample).
    pub fn col_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_samples()];
        for row_vec in self.data.outer_iterator() {
            for (col, &val) in row_vec.iter() {
                sums[col] += val;
            }
        }
        sums
    }

    /// Subset the matrix to the given rows, in the given order.
    pub fn subset_taxa(&self, indices: &[usize]) -> Result<Self> {
        let mut tri_mat = TriMat::new((indices.len(), self.n_samples()));
        let mut new_taxa = Vec::with_capacity(indices.len());

        for (new_row, &old_row) in indices.iter().enumerate() {
            if old_row >= self.n_taxa() {
                return Err(TaxaError::InvalidParameter(format!(
                    "Taxon index {} out of bounds",
                    old_row
                )));
            }
            new_taxa.push(self.taxa[old_row].clone());
            if let Some(row_vec) = self.data.outer_view(old_row) {
                for (col, &val) in row_vec.iter() {
                    tri_mat.add_triplet(new_row, col, val);
                }
            }
        }

        Ok(Self::new(tri_mat.to_csr(), new_taxa, self.sample_ids.clone())?
            .with_index_name(&self.index_name))
    }

    /// Copy of this matrix with new row keys.
    pub fn with_taxa(&self, taxa: Vec<String>) -> Result<Self> {
        Ok(Self::new(self.data.clone(), taxa, self.sample_ids.clone())?
            .with_index_name(&self.index_name))
    }
}

/// Parse one abundance cell, treating anything unusable as zero.
fn parse_cell(raw: &str, row: usize, col: usize) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => {
            log::warn!(
                "Invalid abundance '{}' at row {}, column {}; using 0",
                trimmed,
                row,
                col
            );
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_matrix() -> AbundanceMatrix {
        AbundanceMatrix::from_rows(
            vec![
                "k__Bacteria".to_string(),
                "k__Bacteria|p__Firmicutes".to_string(),
                "k__Bacteria|p__Bacteroidota".to_string(),
            ],
            vec!["S1".to_string(), "S2".to_string(), "S3".to_string()],
            &[
                vec![100.0, 50.0, 0.0],
                vec![60.0, 0.0, 10.0],
                vec![40.0, 50.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dimensions() {
        let mat = create_test_matrix();
        assert_eq!(mat.n_taxa(), 3);
        assert_eq!(mat.n_samples(), 3);
        assert_eq!(mat.index_name(), "ID");
    }

    #[test]
    fn test_get_and_rows() {
        let mat = create_test_matrix();
        assert_eq!(mat.get(0, 0), 100.0);
        assert_eq!(mat.get(0, 2), 0.0);
        assert_eq!(mat.row_dense(1), vec![60.0, 0.0, 10.0]);
        assert_eq!(mat.col_dense(1), vec![50.0, 0.0, 50.0]);
        assert_eq!(mat.col_sums(), vec![200.0, 100.0, 10.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = AbundanceMatrix::from_rows(
            vec!["k__A".to_string()],
            vec!["S1".to_string(), "S2".to_string()],
            &[vec![1.0]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_tsv_roundtrip() {
        let mat = create_test_matrix();
        let temp_file = NamedTempFile::new().unwrap();
        mat.to_tsv(temp_file.path()).unwrap();

        let loaded = AbundanceMatrix::from_tsv(temp_file.path()).unwrap();
        assert_eq!(loaded.taxa(), mat.taxa());
        assert_eq!(loaded.sample_ids(), mat.sample_ids());
        for row in 0..mat.n_taxa() {
            assert_eq!(loaded.row_dense(row), mat.row_dense(row));
        }
    }

    #[test]
    fn test_malformed_cells_are_zero() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ID\tS1\tS2\tS3").unwrap();
        writeln!(file, "k__A\t5\tNA\t-3").unwrap();
        writeln!(file, "k__A|p__B\t2.5").unwrap();
        writeln!(file, "k__A\t99\t99\t99").unwrap();
        file.flush().unwrap();

        let mat = AbundanceMatrix::from_tsv(file.path()).unwrap();
        assert_eq!(mat.n_taxa(), 2);
        assert_eq!(mat.row_dense(0), vec![5.0, 0.0, 0.0]);
        assert_eq!(mat.row_dense(1), vec![2.5, 0.0, 0.0]);
    }

    #[test]
    fn test_subset_taxa() {
        let mat = create_test_matrix().with_index_name("Taxa");
        let subset = mat.subset_taxa(&[2, 0]).unwrap();
        assert_eq!(subset.taxa(), &["k__Bacteria|p__Bacteroidota", "k__Bacteria"]);
        assert_eq!(subset.get(0, 1), 50.0);
        assert_eq!(subset.index_name(), "Taxa");
        assert!(mat.subset_taxa(&[5]).is_err());
    }
}
