//! Control / UC abundance ratios per taxon.

use crate::data::{AbundanceMatrix, ComparisonTable, SampleMetadata, TaxonStat};
use crate::group::{Group, GroupPartition};
use crate::taxonomy::{self, Rank};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::cmp::Ordering;

/// What to do with rows that carry no component for the requested rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Skip the row. Only rows with an explicit rank marker produce records.
    #[default]
    Strict,
    /// Name the row after its deepest rank marker, or its trailing segment
    /// when it has none. Every row with a non-empty path produces a record.
    Lenient,
}

/// Resolve the display name of a row under a policy.
pub fn resolve_taxon(path: &str, rank: Rank, policy: UnresolvedPolicy) -> Option<String> {
    if let Some(name) = taxonomy::rank_name(path, rank) {
        return Some(name);
    }
    match policy {
        UnresolvedPolicy::Strict => None,
        UnresolvedPolicy::Lenient => taxonomy::deepest_component(path).map(taxonomy::clean_any),
    }
}

/// Mean of a group's values, 0 for an empty group.
fn group_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().mean()
    }
}

/// Sample standard deviation (n - 1), 0 below two values.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        0.0
    } else {
        values.iter().std_dev()
    }
}

/// Control over UC ratio with explicit zero handling.
pub fn control_uc_ratio(control_avg: f64, uc_avg: f64) -> f64 {
    if uc_avg > 0.0 {
        control_avg / uc_avg
    } else if control_avg > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Descending by ratio, with `+inf` ahead of every finite value.
fn by_ratio_desc(a: &TaxonStat, b: &TaxonStat) -> Ordering {
    b.control_uc_ratio
        .partial_cmp(&a.control_uc_ratio)
        .unwrap_or(Ordering::Equal)
}

/// Statistics for one row of a table.
pub fn taxon_stat(name: String, row: &[f64], partition: &GroupPartition) -> TaxonStat {
    let control = partition.select(Group::Control, row);
    let uc = partition.select(Group::Uc, row);

    let control_avg = group_mean(&control);
    let uc_avg = group_mean(&uc);
    TaxonStat {
        taxon: name,
        control_avg,
        uc_avg,
        uc_std: sample_std(&uc),
        control_uc_ratio: control_uc_ratio(control_avg, uc_avg),
        control_samples: control.len(),
        uc_samples: uc.len(),
    }
}

/// Compute Control / UC statistics for every taxon of a level table.
///
/// Samples are split with [`crate::group::assign_group`]. Records come back
/// sorted by ratio, highest first; ties keep table order. Malformed rows
/// never cause an error: under [`UnresolvedPolicy::Strict`] they are
/// skipped, under [`UnresolvedPolicy::Lenient`] they are named after
/// whatever the path still offers.
pub fn compute_ratios(
    table: &AbundanceMatrix,
    metadata: &SampleMetadata,
    rank: Rank,
    policy: UnresolvedPolicy,
) -> Vec<TaxonStat> {
    let partition = GroupPartition::from_samples(table.sample_ids(), metadata);
    log::debug!(
        "{} level: {} control, {} UC samples",
        rank,
        partition.control.len(),
        partition.uc.len()
    );

    let mut skipped = 0usize;
    let mut stats: Vec<TaxonStat> = Vec::with_capacity(table.n_taxa());
    for (row, path) in table.taxa().iter().enumerate() {
        let Some(name) = resolve_taxon(path, rank, policy) else {
            skipped += 1;
            continue;
        };
        stats.push(taxon_stat(name, &table.row_dense(row), &partition));
    }
    if skipped > 0 {
        log::debug!("{} rows without a {} component skipped", skipped, rank);
    }

    stats.sort_by(by_ratio_desc);
    stats
}

/// [`compute_ratios`] wrapped in a [`ComparisonTable`].
pub fn compare_groups(
    table: &AbundanceMatrix,
    metadata: &SampleMetadata,
    rank: Rank,
    policy: UnresolvedPolicy,
) -> ComparisonTable {
    ComparisonTable::new(rank, compute_ratios(table, metadata, rank, policy))
}
