//! Per-depth level tables derived from a full taxonomy abundance matrix.
//!
//! Every taxon path is truncated to its first `d` components. Rows that
//! truncate to the same key collapse to the first one in input order; later
//! rows are dropped, not summed, so a higher-rank row stays representative
//! of its clade instead of double counting it. Paths shorter than `d` are
//! left out of that depth's table.

use crate::data::AbundanceMatrix;
use crate::error::Result;
use crate::taxonomy::{self, Rank};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Header of the row-key column in level files.
pub const LEVEL_INDEX: &str = "Taxa";

/// Abundance table truncated to one taxonomic depth.
#[derive(Debug, Clone)]
pub struct LevelTable {
    /// Depth of every row key (kingdom = 1).
    pub depth: usize,
    /// The truncated table.
    pub matrix: AbundanceMatrix,
}

impl LevelTable {
    /// Rank matching this depth, if it is one of the seven named ranks.
    pub fn rank(&self) -> Option<Rank> {
        Rank::from_depth(self.depth)
    }

    /// Write as `Taxa\t<samples...>` TSV.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.matrix.to_tsv(path)
    }

    /// Read a level file back.
    pub fn from_tsv<P: AsRef<Path>>(path: P, depth: usize) -> Result<Self> {
        let matrix = AbundanceMatrix::from_tsv(path)?.with_index_name(LEVEL_INDEX);
        Ok(Self { depth, matrix })
    }
}

/// Deepest path observed in the matrix, counting `|`-separated parts.
pub fn max_depth(matrix: &AbundanceMatrix) -> usize {
    matrix
        .taxa()
        .iter()
        .map(|t| taxonomy::path_depth(t))
        .max()
        .unwrap_or(0)
}

/// Build the table for a single depth.
pub fn build_level_table(matrix: &AbundanceMatrix, depth: usize) -> Result<LevelTable> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keep: Vec<usize> = Vec::new();
    let mut keys: Vec<String> = Vec::new();

    for (row, taxon) in matrix.taxa().iter().enumerate() {
        let Some(key) = taxonomy::truncate(taxon, depth) else {
            continue;
        };
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        keep.push(row);
        keys.push(key);
    }

    let table = matrix
        .subset_taxa(&keep)?
        .with_taxa(keys)?
        .with_index_name(LEVEL_INDEX);
    log::debug!("Level {}: {} of {} rows kept", depth, table.n_taxa(), matrix.n_taxa());
    Ok(LevelTable { depth, matrix: table })
}

/// Build one table per depth from 1 to the deepest path in the matrix.
pub fn build_level_tables(matrix: &AbundanceMatrix) -> Result<BTreeMap<usize, LevelTable>> {
    (1..=max_depth(matrix))
        .map(|depth| Ok((depth, build_level_table(matrix, depth)?)))
        .collect()
}

/// Conventional file name for a depth: `<base>_level_<depth>.tsv`.
pub fn level_file_path<P: AsRef<Path>>(base: P, depth: usize) -> PathBuf {
    let base = base.as_ref();
    let name = format!(
        "{}_level_{}.tsv",
        base.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        depth
    );
    base.with_file_name(name)
}

/// Base path for level files: the input path with its extension removed.
pub fn default_base<P: AsRef<Path>>(input: P) -> PathBuf {
    input.as_ref().with_extension("")
}

/// Write every table under `base`, returning the paths written.
pub fn write_level_tables<P: AsRef<Path>>(
    tables: &BTreeMap<usize, LevelTable>,
    base: P,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(tables.len());
    for (depth, table) in tables {
        let path = level_file_path(base.as_ref(), *depth);
        table.to_tsv(&path)?;
        log::info!("Saved: {}", path.display());
        written.push(path);
    }
    Ok(written)
}
