//! Tournament phases and the per-phase ordering and pairing cost.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::ScheduleConfig;
use crate::league::{rank_number, Competitor, CompetitorId, Division, StableId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Pair by rank proximity.
    Early,
    /// Pair by win count, then rank.
    Mid,
    /// Pair by win count, then loss count.
    Late,
}

impl Phase {
    pub fn for_day(day: u32, config: &ScheduleConfig) -> Self {
        if day <= config.early_last_day {
            Self::Early
        } else if day <= config.mid_last_day {
            Self::Mid
        } else {
            Self::Late
        }
    }

    /// Primary ordering for the greedy pass, without tie-breaking.
    pub fn compare(self, a: &Entrant, b: &Entrant) -> Ordering {
        match self {
            Self::Early => a.rank_number().cmp(&b.rank_number()),
            Self::Mid => b
                .wins
                .cmp(&a.wins)
                .then_with(|| a.rank_score.cmp(&b.rank_score)),
            Self::Late => b
                .wins
                .cmp(&a.wins)
                .then_with(|| a.losses.cmp(&b.losses))
                .then_with(|| a.rank_score.cmp(&b.rank_score)),
        }
    }

    /// Pairing distance; lower is a better match. `rank_distance` is supplied by the
    /// caller because it is measured differently across a division seam.
    pub fn cost(self, a: &Entrant, b: &Entrant, rank_distance: u32) -> i64 {
        let win_diff = i64::from(a.wins.abs_diff(b.wins));
        let loss_diff = i64::from(a.losses.abs_diff(b.losses));
        match self {
            Self::Early => i64::from(rank_distance),
            Self::Mid => 100 * win_diff + i64::from(rank_distance),
            Self::Late => 120 * win_diff + 8 * loss_diff,
        }
    }
}

/// Scheduling view of a competitor, detached from the registry so the
/// scheduler never holds a borrow across bouts.
#[derive(Debug, Clone, PartialEq)]
pub struct Entrant {
    pub id: CompetitorId,
    pub stable_id: StableId,
    pub division: Division,
    pub rank_score: u32,
    pub wins: u32,
    /// Losses plus absences.
    pub losses: u32,
    pub forbidden: BTreeSet<CompetitorId>,
}

impl Entrant {
    pub fn rank_number(&self) -> u32 {
        rank_number(self.rank_score)
    }

    /// True if either side has listed the other as a forbidden opponent.
    pub fn mutually_forbidden(&self, other: &Entrant) -> bool {
        self.forbidden.contains(&other.id) || other.forbidden.contains(&self.id)
    }
}

impl From<&Competitor> for Entrant {
    fn from(competitor: &Competitor) -> Self {
        Self {
            id: competitor.id,
            stable_id: competitor.stable_id,
            division: competitor.division,
            rank_score: competitor.rank_score,
            wins: competitor.wins,
            losses: competitor.effective_losses(),
            forbidden: competitor.forbidden.clone(),
        }
    }
}
