//! Headcount reconciliation after exchanges, retirements, and intake.
//!
//! Walks the ranked divisions top to bottom. Each division is first trimmed
//! to its `max` by pushing its worst members to the top of the division
//! below, then topped up to its floor by pulling the best members from below.
//! A pull that finds the division below empty first feeds that division from
//! its own neighbour, down to the entry pool, which recruits when it is empty
//! too. Every promotion crosses exactly one seam, so nobody is recruited
//! straight into a ranked tier.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LeagueConfig;
use crate::league::{CompetitorId, Division, LeagueRegistry};
use crate::population::recruit::Recruiter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub id: CompetitorId,
    pub from: Division,
    pub to: Division,
}

/// A division left under its floor because nobody was available below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub division: Division,
    pub missing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub demotions: Vec<Transfer>,
    pub promotions: Vec<Transfer>,
    pub recruits: Vec<CompetitorId>,
    pub shortfalls: Vec<Shortfall>,
}

/// Rosters being rebuilt, indexed by [Division::index], best first.
struct Rosters<'r> {
    lists: Vec<VecDeque<CompetitorId>>,
    recruiter: Option<&'r mut dyn Recruiter>,
    report: ReconcileReport,
}

impl Rosters<'_> {
    fn list(&mut self, division: Division) -> &mut VecDeque<CompetitorId> {
        &mut self.lists[division.index()]
    }

    /// Best member available in `division`. An empty division is first fed
    /// from the one below it, so the member climbs one seam at a time and
    /// every step is recorded as a promotion.
    fn pull(
        &mut self,
        division: Division,
        registry: &mut LeagueRegistry,
    ) -> Option<(CompetitorId, Division)> {
        if let Some(id) = self.list(division).pop_front() {
            return Some((id, division));
        }
        if division.is_entry_pool() {
            let id = self.recruiter.as_mut()?.recruit(registry)?;
            self.report.recruits.push(id);
            return Some((id, division));
        }
        let below = division.below()?;
        let (id, from) = self.pull(below, registry)?;
        self.report.promotions.push(Transfer {
            id,
            from,
            to: division,
        });
        Some((id, division))
    }
}

/// Brings every ranked division within its headcount policy and rewrites
/// dense rank scores. Retirements and intake must already be in `registry`.
///
/// Without a recruiter the entry pool cannot grow, and any division that
/// still cannot be filled is reported as a shortfall.
pub fn reconcile(
    registry: &mut LeagueRegistry,
    config: &LeagueConfig,
    recruiter: Option<&mut dyn Recruiter>,
) -> ReconcileReport {
    let mut rosters = Rosters {
        lists: Division::ALL
            .iter()
            .map(|division| registry.roster_ids(*division).into_iter().collect())
            .collect(),
        recruiter,
        report: ReconcileReport::default(),
    };

    for division in Division::RANKED {
        let policy = config.policy(division);
        let Some(below) = division.below() else {
            continue;
        };

        while rosters.list(division).len() > policy.max {
            let Some(id) = rosters.list(division).pop_back() else {
                break;
            };
            rosters.list(below).push_front(id);
            rosters.report.demotions.push(Transfer {
                id,
                from: division,
                to: below,
            });
        }

        let floor = policy.floor();
        while rosters.list(division).len() < floor {
            let Some((id, from)) = rosters.pull(below, registry) else {
                let missing = floor - rosters.list(division).len();
                if policy.fixed {
                    warn!(%division, missing, "fixed division left under target");
                } else {
                    debug!(%division, missing, "division left under minimum");
                }
                rosters.report.shortfalls.push(Shortfall { division, missing });
                break;
            };
            rosters.list(division).push_back(id);
            rosters.report.promotions.push(Transfer {
                id,
                from,
                to: division,
            });
        }
    }

    let Rosters { lists, report, .. } = rosters;
    for (division, list) in Division::ALL.iter().zip(lists) {
        for (position, id) in list.into_iter().enumerate() {
            if let Some(competitor) = registry.get_mut(id) {
                competitor.division = *division;
                competitor.rank_score = u32::try_from(position + 1).unwrap_or(u32::MAX);
            }
        }
    }
    for competitor in registry.iter_mut().filter(|c| !c.active) {
        competitor.rank_score = 0;
    }

    info!(
        demotions = report.demotions.len(),
        promotions = report.promotions.len(),
        recruits = report.recruits.len(),
        shortfalls = report.shortfalls.len(),
        "population reconciled"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::{Competitor, HeadcountPolicy, StableId};
    use crate::population::PoolRecruiter;
    use crate::sim::rng::Rng;

    fn tiny_config() -> LeagueConfig {
        let mut config = LeagueConfig::default();
        for cfg in &mut config.divisions {
            cfg.policy = match cfg.division {
                Division::Makuuchi => HeadcountPolicy::fixed(3),
                Division::Juryo => HeadcountPolicy::fixed(2),
                Division::Maezumo => HeadcountPolicy::banded(0, 0, usize::MAX),
                _ => HeadcountPolicy::banded(0, 2, 4),
            };
        }
        config
    }

    fn fill(registry: &mut LeagueRegistry, division: Division, count: u32) {
        for score in 1..=count {
            let id = registry.allocate_id();
            registry.insert(Competitor::new(
                id,
                format!("R{}", id.0),
                StableId(0),
                division,
                score,
                50.0,
            ));
        }
    }

    #[test]
    fn vacancy_is_filled_from_the_top_of_the_division_below() {
        let config = tiny_config();
        let mut registry = LeagueRegistry::new();
        fill(&mut registry, Division::Makuuchi, 3);
        fill(&mut registry, Division::Juryo, 2);
        fill(&mut registry, Division::Makushita, 3);
        let retiree = registry.roster_ids(Division::Makuuchi)[1];
        let juryo_top = registry.roster_ids(Division::Juryo)[0];
        let makushita_top = registry.roster_ids(Division::Makushita)[0];
        registry.retire(retiree);

        let report = reconcile(&mut registry, &config, None);

        assert_eq!(registry.active_count(Division::Makuuchi), 3);
        assert_eq!(registry.active_count(Division::Juryo), 2);
        assert_eq!(registry.get(juryo_top).unwrap().division, Division::Makuuchi);
        assert_eq!(registry.get(juryo_top).unwrap().rank_score, 3);
        assert_eq!(
            registry.get(makushita_top).unwrap().division,
            Division::Juryo
        );
        assert_eq!(registry.get(retiree).unwrap().rank_score, 0);
        assert_eq!(report.promotions.len(), 2);
        assert!(report.shortfalls.is_empty());
    }

    #[test]
    fn empty_chain_recruits_into_the_entry_pool() {
        let config = tiny_config();
        let mut registry = LeagueRegistry::new();
        let mut recruiter = PoolRecruiter::new(Rng::new(9), 4, 35.0);

        let report = reconcile(&mut registry, &config, Some(&mut recruiter));

        assert_eq!(registry.active_count(Division::Makuuchi), 3);
        assert_eq!(registry.active_count(Division::Juryo), 2);
        assert_eq!(report.recruits.len(), 5);
        assert!(report
            .promotions
            .iter()
            .all(|t| t.to.below() == Some(t.from)));
        let into = |division| report.promotions.iter().filter(|t| t.to == division).count();
        assert_eq!(into(Division::Makuuchi), 3);
        assert_eq!(into(Division::Juryo), 5);
        assert_eq!(into(Division::Jonokuchi), 5);
    }

    #[test]
    fn without_recruiter_shortfall_is_reported() {
        let config = tiny_config();
        let mut registry = LeagueRegistry::new();
        fill(&mut registry, Division::Juryo, 1);

        let report = reconcile(&mut registry, &config, None);

        assert_eq!(registry.active_count(Division::Makuuchi), 1);
        assert_eq!(
            report.shortfalls,
            vec![
                Shortfall {
                    division: Division::Makuuchi,
                    missing: 2
                },
                Shortfall {
                    division: Division::Juryo,
                    missing: 2
                }
            ]
        );
    }

    #[test]
    fn overflow_drops_worst_members_to_the_top_below() {
        let config = tiny_config();
        let mut registry = LeagueRegistry::new();
        fill(&mut registry, Division::Makuuchi, 3);
        fill(&mut registry, Division::Juryo, 2);
        fill(&mut registry, Division::Makushita, 6);
        let worst = *registry.roster_ids(Division::Makushita).last().unwrap();

        let report = reconcile(&mut registry, &config, None);

        assert_eq!(registry.active_count(Division::Makushita), 4);
        let worst = registry.get(worst).unwrap();
        assert_eq!(worst.division, Division::Sandanme);
        assert_eq!(worst.rank_score, 2);
        assert_eq!(report.demotions.len(), 2);
    }
}
