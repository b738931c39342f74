//! Reads-per-million (RPM) normalization.
//!
//! RPM divides each count by the total counts in its sample and multiplies
//! by one million, so samples sequenced to different depths can be compared.

use crate::data::AbundanceMatrix;
use crate::error::Result;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use sprs::TriMat;

/// Scale factor for reads per million.
pub const RPM_SCALE: f64 = 1_000_000.0;

/// Result of RPM normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpmMatrix {
    /// The normalized data (taxa × samples).
    #[serde(skip)]
    pub data: DMatrix<f64>,
    /// Row keys.
    pub taxa: Vec<String>,
    /// Sample identifiers.
    pub sample_ids: Vec<String>,
    /// Column sums of the full input matrix, before normalization.
    pub library_sizes: Vec<f64>,
}

impl RpmMatrix {
    /// Get the normalized value for a taxon and sample.
    pub fn get(&self, taxon: usize, sample: usize) -> f64 {
        self.data[(taxon, sample)]
    }

    /// Number of taxa.
    pub fn n_taxa(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Get a row (taxon) as a vector.
    pub fn row(&self, taxon: usize) -> Vec<f64> {
        self.data.row(taxon).iter().cloned().collect()
    }

    /// Get a column (sample) as a vector.
    pub fn col(&self, sample: usize) -> Vec<f64> {
        self.data.column(sample).iter().cloned().collect()
    }

    /// RPM values of the first row with the given key.
    pub fn row_by_key(&self, taxon: &str) -> Option<Vec<f64>> {
        self.taxa
            .iter()
            .position(|t| t == taxon)
            .map(|idx| self.row(idx))
    }

    /// Convert back to an abundance matrix for the comparison engine.
    pub fn to_abundance(&self, index_name: &str) -> Result<AbundanceMatrix> {
        let mut tri_mat = TriMat::new((self.n_taxa(), self.n_samples()));
        for row in 0..self.n_taxa() {
            for col in 0..self.n_samples() {
                let val = self.data[(row, col)];
                if val > 0.0 {
                    tri_mat.add_triplet(row, col, val);
                }
            }
        }
        Ok(AbundanceMatrix::new(tri_mat.to_csr(), self.taxa.clone(), self.sample_ids.clone())?
            .with_index_name(index_name))
    }
}

/// Convert raw counts to reads per million.
///
/// # Formula
/// For sample j: RPM(x_ij) = x_ij / sum(x_j) * 1e6
///
/// Column sums are taken over every row of `counts`; filter taxa after
/// normalizing, not before, or values stop being comparable between
/// reports. A sample whose total is zero gets an all-zero column.
pub fn to_rpm(counts: &AbundanceMatrix) -> RpmMatrix {
    let n_taxa = counts.n_taxa();
    let n_samples = counts.n_samples();
    let library_sizes = counts.col_sums();

    let mut data = DMatrix::zeros(n_taxa, n_samples);
    for (row, row_vec) in counts.data().outer_iterator().enumerate() {
        for (col, &val) in row_vec.iter() {
            let lib_size = library_sizes[col];
            if lib_size > 0.0 {
                data[(row, col)] = val / lib_size * RPM_SCALE;
            }
        }
    }

    for (sample, lib_size) in counts.sample_ids().iter().zip(&library_sizes) {
        if *lib_size == 0.0 {
            log::warn!("Sample {} has zero total counts, RPM set to 0", sample);
        }
    }

    RpmMatrix {
        data,
        taxa: counts.taxa().to_vec(),
        sample_ids: counts.sample_ids().to_vec(),
        library_sizes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn counts() -> AbundanceMatrix {
        AbundanceMatrix::from_rows(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["S1".into(), "S2".into(), "S3".into()],
            &[
                vec![10.0, 3.0, 0.0],
                vec![30.0, 0.0, 0.0],
                vec![60.0, 1.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_columns_sum_to_one_million() {
        let rpm = to_rpm(&counts());
        for col in 0..2 {
            let total: f64 = rpm.col(col).iter().sum();
            assert_relative_eq!(total, RPM_SCALE, epsilon = 1e-6);
        }
        assert_relative_eq!(rpm.get(0, 0), 100_000.0);
        assert_relative_eq!(rpm.get(1, 1), 0.0);
        assert_relative_eq!(rpm.get(2, 1), 250_000.0);
    }

    #[test]
    fn test_zero_column_is_zero() {
        let rpm = to_rpm(&counts());
        assert_eq!(rpm.col(2), vec![0.0, 0.0, 0.0]);
        assert_eq!(rpm.library_sizes, vec![100.0, 4.0, 0.0]);
    }

    #[test]
    fn test_filter_after_normalizing() {
        let full = counts();
        let rpm = to_rpm(&full);
        // Normalizing a subset would inflate the remaining rows.
        let subset_rpm = to_rpm(&full.subset_taxa(&[0]).unwrap());
        assert_relative_eq!(rpm.row_by_key("a").unwrap()[0], 100_000.0);
        assert_relative_eq!(subset_rpm.get(0, 0), RPM_SCALE);
        assert!(rpm.row_by_key("missing").is_none());
    }

    #[test]
    fn test_to_abundance() {
        let rpm = to_rpm(&counts());
        let back = rpm.to_abundance("Taxa").unwrap();
        assert_eq!(back.index_name(), "Taxa");
        assert_relative_eq!(back.get(2, 0), 600_000.0);
    }
}
