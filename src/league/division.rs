use std::fmt;

use serde::{Deserialize, Serialize};

/// League tiers in strict order, highest first.
///
/// The derived `Ord` follows declaration order, so `Makuuchi < Juryo`: a
/// smaller value is a higher division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Division {
    Makuuchi,
    Juryo,
    Makushita,
    Sandanme,
    Jonidan,
    Jonokuchi,
    /// Unranked entry pool below the lowest tier.
    Maezumo,
}

impl Division {
    /// The six ranked tiers, highest first.
    pub const RANKED: [Division; 6] = [
        Division::Makuuchi,
        Division::Juryo,
        Division::Makushita,
        Division::Sandanme,
        Division::Jonidan,
        Division::Jonokuchi,
    ];

    /// Every division including the entry pool, highest first.
    pub const ALL: [Division; 7] = [
        Division::Makuuchi,
        Division::Juryo,
        Division::Makushita,
        Division::Sandanme,
        Division::Jonidan,
        Division::Jonokuchi,
        Division::Maezumo,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn above(self) -> Option<Division> {
        self.index()
            .checked_sub(1)
            .map(|index| Division::ALL[index])
    }

    pub fn below(self) -> Option<Division> {
        Division::ALL.get(self.index() + 1).copied()
    }

    /// The two sekitori tiers with fixed headcount.
    pub fn is_elite(self) -> bool {
        matches!(self, Division::Makuuchi | Division::Juryo)
    }

    pub fn is_entry_pool(self) -> bool {
        self == Division::Maezumo
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Makuuchi => "makuuchi",
            Self::Juryo => "juryo",
            Self::Makushita => "makushita",
            Self::Sandanme => "sandanme",
            Self::Jonidan => "jonidan",
            Self::Jonokuchi => "jonokuchi",
            Self::Maezumo => "maezumo",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Headcount policy for one division.
///
/// Fixed divisions are topped up to `target`; banded divisions only to `min`.
/// Every division is trimmed down to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadcountPolicy {
    pub min: usize,
    pub max: usize,
    pub target: usize,
    pub fixed: bool,
}

impl HeadcountPolicy {
    pub const fn fixed(size: usize) -> Self {
        Self {
            min: size,
            max: size,
            target: size,
            fixed: true,
        }
    }

    pub const fn banded(min: usize, target: usize, max: usize) -> Self {
        Self {
            min,
            max,
            target,
            fixed: false,
        }
    }

    /// Headcount the reconciler tops the division up to.
    pub fn floor(&self) -> usize {
        if self.fixed {
            self.target
        } else {
            self.min
        }
    }
}

/// The seam between two adjacent divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoundaryId {
    pub upper: Division,
    pub lower: Division,
}

impl BoundaryId {
    /// Returns the seam directly under `upper`, if `upper` has a ranked division below it.
    pub fn below(upper: Division) -> Option<Self> {
        let lower = upper.below()?;
        if lower.is_entry_pool() {
            return None;
        }
        Some(Self { upper, lower })
    }

    /// All seams between ranked divisions, highest first.
    pub fn ranked_seams() -> Vec<Self> {
        Division::RANKED
            .iter()
            .filter_map(|division| Self::below(*division))
            .collect()
    }

    /// The entry boundary into the salaried ranks.
    pub fn is_sekitori(&self) -> bool {
        self.upper == Division::Juryo && self.lower == Division::Makushita
    }
}

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.upper, self.lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_follow_declaration_order() {
        assert_eq!(Division::Makuuchi.above(), None);
        assert_eq!(Division::Makuuchi.below(), Some(Division::Juryo));
        assert_eq!(Division::Jonokuchi.below(), Some(Division::Maezumo));
        assert_eq!(Division::Maezumo.below(), None);
        assert!(Division::Makuuchi < Division::Jonokuchi);
    }

    #[test]
    fn ranked_seams_exclude_entry_pool() {
        let seams = BoundaryId::ranked_seams();
        assert_eq!(seams.len(), 5);
        assert_eq!(seams[0].to_string(), "makuuchi/juryo");
        assert!(seams[1].is_sekitori());
        assert!(seams.iter().all(|seam| !seam.lower.is_entry_pool()));
    }
}
