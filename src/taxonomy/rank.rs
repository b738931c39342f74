//! Taxonomic ranks and their Kraken/MPA-style prefixes.

use crate::error::{Result, TaxaError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A taxonomic rank, ordered from kingdom (depth 1) to species (depth 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    /// Ranks in path order.
    pub const ALL: [Rank; 7] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// Depth of this rank inside a taxon path (kingdom = 1).
    pub fn depth(&self) -> usize {
        match self {
            Self::Kingdom => 1,
            Self::Phylum => 2,
            Self::Class => 3,
            Self::Order => 4,
            Self::Family => 5,
            Self::Genus => 6,
            Self::Species => 7,
        }
    }

    /// Look up a rank by depth.
    pub fn from_depth(depth: usize) -> Option<Self> {
        Self::ALL.get(depth.checked_sub(1)?).copied()
    }

    /// Two-letter component prefix, e.g. `p__`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Kingdom => "k__",
            Self::Phylum => "p__",
            Self::Class => "c__",
            Self::Order => "o__",
            Self::Family => "f__",
            Self::Genus => "g__",
            Self::Species => "s__",
        }
    }

    /// Rank whose prefix starts the given component.
    pub fn of_component(component: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|rank| component.starts_with(rank.prefix()))
    }

    /// Lowercase rank name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Kingdom => "kingdom",
            Self::Phylum => "phylum",
            Self::Class => "class",
            Self::Order => "order",
            Self::Family => "family",
            Self::Genus => "genus",
            Self::Species => "species",
        }
    }

    /// Name with a leading capital, for report titles.
    pub fn title(&self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rank {
    type Err = TaxaError;

    /// Accepts a depth number (`"2"`) or a rank name (`"Phylum"`).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(depth) = trimmed.parse::<usize>() {
            return Self::from_depth(depth).ok_or_else(|| TaxaError::UnknownRank(s.to_string()));
        }
        let lower = trimmed.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|rank| rank.name() == lower)
            .ok_or_else(|| TaxaError::UnknownRank(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_roundtrip() {
        for rank in Rank::ALL {
            assert_eq!(Rank::from_depth(rank.depth()), Some(rank));
        }
        assert_eq!(Rank::from_depth(0), None);
        assert_eq!(Rank::from_depth(8), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("2".parse::<Rank>().unwrap(), Rank::Phylum);
        assert_eq!("Family".parse::<Rank>().unwrap(), Rank::Family);
        assert_eq!(" genus ".parse::<Rank>().unwrap(), Rank::Genus);
        assert!("9".parse::<Rank>().is_err());
        assert!("domain".parse::<Rank>().is_err());
    }

    #[test]
    fn test_of_component() {
        assert_eq!(Rank::of_component("g__Bacteroides"), Some(Rank::Genus));
        assert_eq!(Rank::of_component("x__Other"), None);
        assert_eq!(Rank::of_component("Bacteroides"), None);
    }

    #[test]
    fn test_title() {
        assert_eq!(Rank::Species.title(), "Species");
    }
}
