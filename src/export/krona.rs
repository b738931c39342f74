//! Krona text input, one file per sample.
//!
//! Each line is the taxon path with `|` turned into tabs, followed by the
//! count. Feed the files to `ktImportText` to render the charts.

use crate::data::{AbundanceMatrix, SampleMetadata};
use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Krona lines for one sample column, zero counts omitted.
pub fn krona_lines(matrix: &AbundanceMatrix, col: usize) -> Vec<String> {
    matrix
        .taxa()
        .iter()
        .enumerate()
        .filter_map(|(row, taxon)| {
            let count = matrix.get(row, col);
            (count > 0.0).then(|| format!("{}\t{}", taxon.replace('|', "\t"), count))
        })
        .collect()
}

/// Write `<srr>_krona.txt` for every sample that has an SRR accession.
///
/// Samples without an accession or without any counts are skipped with a
/// warning. Returns the files written.
pub fn write_krona_inputs<P: AsRef<Path>>(
    matrix: &AbundanceMatrix,
    metadata: &SampleMetadata,
    output_dir: P,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for (col, sample) in matrix.sample_ids().iter().enumerate() {
        let Some(srr) = metadata.srr(sample) else {
            log::warn!("No SRR mapping found for sample {}", sample);
            continue;
        };
        let lines = krona_lines(matrix, col);
        if lines.is_empty() {
            log::warn!("No data for sample {}", sample);
            continue;
        }

        let path = output_dir.join(format!("{}_krona.txt", srr));
        let mut writer = BufWriter::new(File::create(&path)?);
        for line in &lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        log::info!("{} -> {}", sample, path.display());
        written.push(path);
    }
    Ok(written)
}
