//! Taxonomy path grammar: ranks, prefixes, and component extraction.

mod path;
mod rank;

pub use path::{
    clean_any, clean_name, component_for, components, deepest_component, path_depth,
    rank_component, rank_name, truncate, PATH_DELIMITER,
};
pub use rank::Rank;
