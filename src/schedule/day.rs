//! Whole-league scheduling for one tournament day.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::LeagueConfig;
use crate::league::{CompetitorId, Division, LeagueRegistry};
use crate::schedule::boundary::{schedule_boundaries, BoundaryActivation, BoundaryContext};
use crate::schedule::faced::FacedSet;
use crate::schedule::pairing::{oriented, pair_leftovers, schedule_division, Pairing, PairingStage};
use crate::schedule::phase::{Entrant, Phase};
use crate::sim::rng::Rng;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DaySchedule {
    pub day: u32,
    pub pairs: Vec<Pairing>,
    /// Available competitors left without a bout.
    pub byes: Vec<CompetitorId>,
    /// Competitors sitting out on a day their division fights.
    pub absent: Vec<CompetitorId>,
    pub activations: Vec<BoundaryActivation>,
}

/// Builds the day's bouts: in-division pairing for every division fighting
/// today, then seam pairing over the leftovers, then one more in-division
/// pass for divisions still holding two or more leftovers.
pub fn schedule_day(
    registry: &LeagueRegistry,
    faced: &mut FacedSet,
    day: u32,
    config: &LeagueConfig,
    rng: &mut Rng,
) -> DaySchedule {
    let mut schedule = DaySchedule {
        day,
        ..DaySchedule::default()
    };
    let mut leftovers: BTreeMap<Division, Vec<Entrant>> = BTreeMap::new();

    for division in Division::RANKED {
        if !config.fights_on(division, day) {
            continue;
        }
        let roster = registry.roster(division);
        schedule
            .absent
            .extend(roster.iter().filter(|c| c.kyujo).map(|c| c.id));
        let pool: Vec<Entrant> = roster
            .iter()
            .filter(|c| !c.kyujo)
            .map(|c| Entrant::from(*c))
            .collect();

        let pairing = schedule_division(&pool, faced, day, &config.schedule, rng);
        schedule.pairs.extend(pairing.pairs);

        let mut by_id: BTreeMap<CompetitorId, Entrant> =
            pool.into_iter().map(|e| (e.id, e)).collect();
        let byes: Vec<Entrant> = pairing
            .byes
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        leftovers.insert(division, byes);
    }

    let context = boundary_context(registry, day, config);
    let (boundary_pairs, activations) =
        schedule_boundaries(&mut leftovers, faced, &context, &config.schedule);
    schedule.pairs.extend(boundary_pairs);
    schedule.activations = activations;

    let phase = Phase::for_day(day, &config.schedule);
    for pool in leftovers.values_mut() {
        if pool.len() < 2 {
            continue;
        }
        let positions: Vec<usize> = (0..pool.len()).collect();
        let (pairs, rest) =
            pair_leftovers(pool, positions, &PairingStage::LADDER, phase, faced, day);
        for (i, j, stage) in pairs {
            faced.mark(pool[i].id, pool[j].id);
            schedule.pairs.push(oriented(&pool[i], &pool[j], stage, None));
        }
        let rest: BTreeSet<usize> = rest.into_iter().collect();
        let kept: Vec<Entrant> = pool
            .drain(..)
            .enumerate()
            .filter(|(i, _)| rest.contains(i))
            .map(|(_, e)| e)
            .collect();
        *pool = kept;
    }

    schedule.byes = leftovers
        .values()
        .flat_map(|pool| pool.iter().map(|e| e.id))
        .collect();
    schedule
}

fn boundary_context(registry: &LeagueRegistry, day: u32, config: &LeagueConfig) -> BoundaryContext {
    let mut context = BoundaryContext {
        day,
        ..BoundaryContext::default()
    };
    for division in Division::RANKED {
        let headcount = registry.active_count(division);
        let policy = config.policy(division);
        if policy.fixed && headcount < policy.target {
            context.vacancies.insert(division);
        }
        context
            .headcounts
            .insert(division, u32::try_from(headcount).unwrap_or(u32::MAX));
    }
    context
}
