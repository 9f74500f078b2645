use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::league::Division;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorId(pub u32);

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Training-group affiliation. Stablemates are not paired except as a last resort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(pub u16);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub shikona: String,
    pub stable_id: StableId,
    pub division: Division,
    /// Dense ordinal within the division, 1 is the top. 0 once retired.
    pub rank_score: u32,
    /// Opaque strength consumed only by the bout model.
    pub ability: f64,
    pub wins: u32,
    pub losses: u32,
    /// Bout days missed while sitting out this tournament.
    #[serde(default)]
    pub absences: u32,
    pub active: bool,
    /// Active but sitting out the current tournament.
    #[serde(default)]
    pub kyujo: bool,
    /// Opponents this competitor may never be paired with.
    #[serde(default)]
    pub forbidden: BTreeSet<CompetitorId>,
}

impl Competitor {
    pub fn new(
        id: CompetitorId,
        shikona: impl Into<String>,
        stable_id: StableId,
        division: Division,
        rank_score: u32,
        ability: f64,
    ) -> Self {
        Self {
            id,
            shikona: shikona.into(),
            stable_id,
            division,
            rank_score,
            ability,
            wins: 0,
            losses: 0,
            absences: 0,
            active: true,
            kyujo: false,
            forbidden: BTreeSet::new(),
        }
    }

    /// Can be scheduled today.
    pub fn is_available(&self) -> bool {
        self.active && !self.kyujo
    }

    /// Losses plus absences; every missed bout counts against the record.
    pub fn effective_losses(&self) -> u32 {
        self.losses + self.absences
    }

    pub fn net_wins(&self) -> i64 {
        i64::from(self.wins) - i64::from(self.effective_losses())
    }

    /// Banzuke number shared by the East and West slot of one rank.
    pub fn rank_number(&self) -> u32 {
        rank_number(self.rank_score)
    }

    pub fn forbids(&self, other: CompetitorId) -> bool {
        self.forbidden.contains(&other)
    }

    pub fn reset_tally(&mut self) {
        self.wins = 0;
        self.losses = 0;
        self.absences = 0;
    }
}

/// Converts a dense rank score into its banzuke number: 1 and 2 share number 1.
pub fn rank_number(rank_score: u32) -> u32 {
    (rank_score + 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_losses_include_absences() {
        let mut c = Competitor::new(
            CompetitorId(1),
            "Test",
            StableId(1),
            Division::Juryo,
            3,
            50.0,
        );
        c.wins = 2;
        c.losses = 3;
        c.absences = 4;
        assert_eq!(c.effective_losses(), 7);
        assert_eq!(c.net_wins(), -5);
        assert_eq!(c.rank_number(), 2);
    }

    #[test]
    fn rank_numbers_pair_east_and_west() {
        assert_eq!(rank_number(1), 1);
        assert_eq!(rank_number(2), 1);
        assert_eq!(rank_number(3), 2);
        assert_eq!(rank_number(0), 0);
    }
}
