//! Next-banzuke ordering after the exchange has moved competitors between divisions.

use std::collections::BTreeMap;

use crate::config::LeagueConfig;
use crate::exchange::ExchangeFlags;
use crate::league::{Competitor, CompetitorId, Division, LeagueRegistry};

pub trait RankCommittee {
    /// Rewrites dense rank scores in every division.
    fn publish(
        &mut self,
        registry: &mut LeagueRegistry,
        flags: &BTreeMap<CompetitorId, ExchangeFlags>,
        config: &LeagueConfig,
    );
}

/// Orders each division as: arrivals from above, stayers by performance,
/// arrivals from below.
///
/// A stayer's key is `rank_score - net_wins * shift - nudge / 2`, where
/// `shift` is the division's rank-score steps per net win and `nudge` the
/// half-step exchange flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceCommittee;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Arrival {
    FromAbove,
    Stayed,
    FromBelow,
}

fn arrival(competitor: &Competitor, flags: Option<&ExchangeFlags>) -> Arrival {
    match flags {
        Some(f) if f.assigned_next_division == Some(competitor.division) && f.can_demote => {
            Arrival::FromAbove
        }
        Some(f) if f.assigned_next_division == Some(competitor.division) && f.can_promote => {
            Arrival::FromBelow
        }
        _ => Arrival::Stayed,
    }
}

impl RankCommittee for PerformanceCommittee {
    fn publish(
        &mut self,
        registry: &mut LeagueRegistry,
        flags: &BTreeMap<CompetitorId, ExchangeFlags>,
        config: &LeagueConfig,
    ) {
        for division in Division::ALL {
            let shift = config.division(division).rank_shift_per_win;
            let mut keyed: Vec<(Arrival, f64, u32, CompetitorId)> = registry
                .roster(division)
                .into_iter()
                .map(|c| {
                    let flag = flags.get(&c.id);
                    let nudge = flag.map_or(0, |f| f.half_step_nudge);
                    let key = f64::from(c.rank_score)
                        - c.net_wins() as f64 * shift
                        - f64::from(nudge) / 2.0;
                    (arrival(c, flag), key, c.rank_score, c.id)
                })
                .collect();
            keyed.sort_by(|a, b| {
                a.0.cmp(&b.0)
                    .then_with(|| a.1.total_cmp(&b.1))
                    .then_with(|| a.2.cmp(&b.2))
                    .then_with(|| a.3.cmp(&b.3))
            });
            for (position, (_, _, _, id)) in keyed.into_iter().enumerate() {
                if let Some(competitor) = registry.get_mut(id) {
                    competitor.rank_score = u32::try_from(position + 1).unwrap_or(u32::MAX);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::StableId;

    fn add(registry: &mut LeagueRegistry, id: u32, rank_score: u32, wins: u32, losses: u32) {
        let mut c = Competitor::new(
            CompetitorId(id),
            "R",
            StableId(0),
            Division::Makushita,
            rank_score,
            50.0,
        );
        c.wins = wins;
        c.losses = losses;
        registry.insert(c);
    }

    #[test]
    fn arrivals_bracket_the_reordered_stayers() {
        let mut registry = LeagueRegistry::new();
        add(&mut registry, 1, 1, 2, 5);
        add(&mut registry, 2, 2, 6, 1);
        add(&mut registry, 3, 3, 4, 3);
        // 4 arrived from Juryo, 5 from Sandanme; rank scores are from their old divisions.
        add(&mut registry, 4, 28, 4, 11);
        add(&mut registry, 5, 1, 7, 0);

        let mut flags = BTreeMap::new();
        flags.insert(
            CompetitorId(4),
            ExchangeFlags {
                can_demote: true,
                assigned_next_division: Some(Division::Makushita),
                ..ExchangeFlags::default()
            },
        );
        flags.insert(
            CompetitorId(5),
            ExchangeFlags {
                can_promote: true,
                assigned_next_division: Some(Division::Makushita),
                ..ExchangeFlags::default()
            },
        );

        PerformanceCommittee.publish(&mut registry, &flags, &LeagueConfig::default());

        let order = registry.roster_ids(Division::Makushita);
        assert_eq!(
            order,
            vec![
                CompetitorId(4),
                CompetitorId(2),
                CompetitorId(3),
                CompetitorId(1),
                CompetitorId(5)
            ]
        );
    }
}
