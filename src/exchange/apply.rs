use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::exchange::resolver::ExchangeOutcome;
use crate::league::{CompetitorId, Division, LeagueRegistry};

/// What the exchange decided for one competitor, as handed to the rank committee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExchangeFlags {
    pub can_promote: bool,
    pub can_demote: bool,
    pub assigned_next_division: Option<Division>,
    /// +1 for a borderline promotion candidate left behind, -1 for a borderline
    /// demotion candidate that survived. The committee breaks near-ties with it.
    pub half_step_nudge: i8,
}

/// Collects per-competitor flags from every resolved seam.
pub fn exchange_flags(outcomes: &[ExchangeOutcome]) -> BTreeMap<CompetitorId, ExchangeFlags> {
    let mut flags: BTreeMap<CompetitorId, ExchangeFlags> = BTreeMap::new();
    for outcome in outcomes {
        for id in &outcome.promoted_ids {
            let entry = flags.entry(*id).or_default();
            entry.can_promote = true;
            entry.assigned_next_division = Some(outcome.boundary.upper);
        }
        for id in &outcome.demoted_ids {
            let entry = flags.entry(*id).or_default();
            entry.can_demote = true;
            entry.assigned_next_division = Some(outcome.boundary.lower);
        }
    }
    for outcome in outcomes {
        for candidate in &outcome.promotion_candidates {
            if candidate.borderline && !outcome.promoted_ids.contains(&candidate.id) {
                let entry = flags.entry(candidate.id).or_default();
                if entry.assigned_next_division.is_none() {
                    entry.half_step_nudge = 1;
                }
            }
        }
        for candidate in &outcome.demotion_candidates {
            if candidate.borderline && !outcome.demoted_ids.contains(&candidate.id) {
                let entry = flags.entry(candidate.id).or_default();
                if entry.assigned_next_division.is_none() {
                    entry.half_step_nudge = -1;
                }
            }
        }
    }
    flags
}

/// Moves every promoted and demoted competitor across its seam.
///
/// Only divisions change here; rank scores are rewritten by the committee.
/// Returns how many competitors moved.
pub fn apply_exchanges(registry: &mut LeagueRegistry, outcomes: &[ExchangeOutcome]) -> usize {
    let mut moved = 0;
    for outcome in outcomes {
        let moves = outcome
            .promoted_ids
            .iter()
            .map(|id| (*id, outcome.boundary.upper))
            .chain(
                outcome
                    .demoted_ids
                    .iter()
                    .map(|id| (*id, outcome.boundary.lower)),
            );
        for (id, destination) in moves {
            if let Some(competitor) = registry.get_mut(id) {
                debug!(%id, from = %competitor.division, to = %destination, "exchange move");
                competitor.division = destination;
                moved += 1;
            }
        }
    }
    moved
}
