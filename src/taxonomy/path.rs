//! Parsing of pipe-delimited taxon paths such as
//! `k__Bacteria|p__Firmicutes|c__Bacilli`.

use super::rank::Rank;
use regex::Regex;
use std::sync::OnceLock;

/// Separator between ranked components.
pub const PATH_DELIMITER: char = '|';

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"^[a-z]__").unwrap())
}

/// Non-empty components of a taxon path, in order.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_DELIMITER).filter(|part| !part.is_empty())
}

/// Number of `|`-separated parts, counting empty ones.
///
/// This is the depth used when truncating paths into level tables.
pub fn path_depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split(PATH_DELIMITER).count()
    }
}

/// First `depth` parts of a path joined back with `|`.
///
/// Returns `None` when the path has fewer than `depth` parts.
pub fn truncate(path: &str, depth: usize) -> Option<String> {
    if depth == 0 || path_depth(path) < depth {
        return None;
    }
    let parts: Vec<&str> = path.split(PATH_DELIMITER).take(depth).collect();
    Some(parts.join("|"))
}

/// Component whose text begins with `prefix`, e.g. `p__`.
pub fn rank_component<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    components(path).find(|part| part.starts_with(prefix))
}

/// Component for a known rank.
pub fn component_for(path: &str, rank: Rank) -> Option<&str> {
    rank_component(path, rank.prefix())
}

/// Strip a rank prefix and turn underscores into spaces.
pub fn clean_name(component: &str, prefix: &str) -> String {
    component
        .strip_prefix(prefix)
        .unwrap_or(component)
        .replace('_', " ")
}

/// Strip whatever `x__` marker a component carries and clean it.
pub fn clean_any(component: &str) -> String {
    match marker_regex().find(component) {
        Some(m) => clean_name(component, m.as_str()),
        None => component.replace('_', " "),
    }
}

/// Deepest component carrying a rank marker, falling back to the trailing
/// non-empty segment.
pub fn deepest_component(path: &str) -> Option<&str> {
    let parts: Vec<&str> = components(path).collect();
    parts
        .iter()
        .rev()
        .find(|part| marker_regex().is_match(part))
        .or_else(|| parts.last())
        .copied()
}

/// Cleaned name of the component for `rank`.
pub fn rank_name(path: &str, rank: Rank) -> Option<String> {
    component_for(path, rank).map(|c| clean_name(c, rank.prefix()))
}
