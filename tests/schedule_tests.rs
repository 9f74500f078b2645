use std::collections::{BTreeMap, BTreeSet};

use basho::config::{LeagueConfig, ScheduleConfig};
use basho::league::{CompetitorId, Division, LeagueBuilder, StableId};
use basho::schedule::{
    schedule_boundaries, schedule_day, schedule_division, ActivationReason, BoundaryContext,
    Entrant, FacedSet, PairingStage,
};
use basho::sim::Rng;

fn entrant(id: u32, stable: u16, rank_score: u32) -> Entrant {
    Entrant {
        id: CompetitorId(id),
        stable_id: StableId(stable),
        division: Division::Makushita,
        rank_score,
        wins: 0,
        losses: 0,
        forbidden: BTreeSet::new(),
    }
}

fn unordered(a: CompetitorId, b: CompetitorId) -> (CompetitorId, CompetitorId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[test]
fn four_distinct_stables_pair_completely_on_day_one() {
    let pool: Vec<Entrant> = (1..=4).map(|i| entrant(i, i as u16, i)).collect();
    let mut faced = FacedSet::new();
    let mut rng = Rng::new(7);

    let result = schedule_division(&pool, &mut faced, 1, &ScheduleConfig::default(), &mut rng);

    assert_eq!(result.pairs.len(), 2);
    assert!(result.byes.is_empty());
    assert!(result.pairs.iter().all(|p| p.stage == PairingStage::Strict));
    for pool_member in &pool {
        assert_eq!(faced.bouts_recorded(pool_member.id), 1);
    }
}

#[test]
fn tiny_pools_yield_byes_not_errors() {
    let mut faced = FacedSet::new();
    let mut rng = Rng::new(7);
    let config = ScheduleConfig::default();

    let empty = schedule_division(&[], &mut faced, 1, &config, &mut rng);
    assert!(empty.pairs.is_empty() && empty.byes.is_empty());

    let single = schedule_division(&[entrant(1, 1, 1)], &mut faced, 1, &config, &mut rng);
    assert!(single.pairs.is_empty());
    assert_eq!(single.byes, vec![CompetitorId(1)]);

    let odd: Vec<Entrant> = (1..=5).map(|i| entrant(i, i as u16, i)).collect();
    let result = schedule_division(&odd, &mut faced, 1, &config, &mut rng);
    assert_eq!(result.pairs.len(), 2);
    assert_eq!(result.byes.len(), 1);
}

#[test]
fn stablemates_meet_only_when_nobody_else_is_left() {
    let mut faced = FacedSet::new();
    let mut rng = Rng::new(3);
    let config = ScheduleConfig::default();

    let pool = vec![entrant(1, 9, 1), entrant(2, 9, 2)];
    let result = schedule_division(&pool, &mut faced, 1, &config, &mut rng);
    assert_eq!(result.pairs.len(), 1);
    assert_eq!(result.pairs[0].stage, PairingStage::RelaxStable);

    let mut faced = FacedSet::new();
    let pool = vec![
        entrant(1, 9, 1),
        entrant(2, 9, 2),
        entrant(3, 4, 3),
        entrant(4, 5, 4),
    ];
    let result = schedule_division(&pool, &mut faced, 1, &config, &mut rng);
    assert_eq!(result.pairs.len(), 2);
    assert!(result.pairs.iter().all(|p| p.stage == PairingStage::Strict));
}

#[test]
fn rematch_is_relaxed_before_stable() {
    let config = ScheduleConfig::default();
    let mut faced = FacedSet::new();
    faced.mark(CompetitorId(1), CompetitorId(2));
    let mut rng = Rng::new(1);

    let pool = vec![entrant(1, 1, 1), entrant(2, 2, 2)];
    let result = schedule_division(&pool, &mut faced, 2, &config, &mut rng);
    assert_eq!(result.pairs.len(), 1);
    assert_eq!(result.pairs[0].stage, PairingStage::RelaxRematch);
}

#[test]
fn forbidden_opponents_are_never_paired() {
    let config = ScheduleConfig::default();
    let mut faced = FacedSet::new();
    let mut rng = Rng::new(1);

    let mut a = entrant(1, 1, 1);
    a.forbidden.insert(CompetitorId(2));
    let pool = vec![a, entrant(2, 2, 2)];
    let result = schedule_division(&pool, &mut faced, 1, &config, &mut rng);
    assert!(result.pairs.is_empty());
    assert_eq!(result.byes.len(), 2);
}

#[test]
fn full_tournament_respects_strict_constraints_and_forbidden_pairs() {
    let config = LeagueConfig::default();
    let league = LeagueBuilder::new(&config).forbidden_pairs(60).build();
    let registry = &league.registry;
    let mut faced = FacedSet::new();
    let mut rng = Rng::new(config.seed);
    let mut seen: BTreeSet<(CompetitorId, CompetitorId)> = BTreeSet::new();

    for day in 1..=config.tournament_days {
        let schedule = schedule_day(registry, &mut faced, day, &config, &mut rng);
        let mut today = BTreeSet::new();
        for pairing in &schedule.pairs {
            let east = registry.get(pairing.east).unwrap();
            let west = registry.get(pairing.west).unwrap();
            assert!(!east.forbids(west.id) && !west.forbids(east.id));
            assert!(today.insert(pairing.east), "east paired twice on day {day}");
            assert!(today.insert(pairing.west), "west paired twice on day {day}");

            let key = unordered(pairing.east, pairing.west);
            if pairing.stage == PairingStage::Strict {
                assert_ne!(east.stable_id, west.stable_id);
                assert!(!seen.contains(&key), "strict rematch on day {day}");
            }
            seen.insert(key);
        }
    }
}

#[test]
fn lower_divisions_rest_on_even_days() {
    let config = LeagueConfig::default();
    let league = LeagueBuilder::new(&config).build();
    let mut faced = FacedSet::new();
    let mut rng = Rng::new(1);

    let day_two = schedule_day(&league.registry, &mut faced, 2, &config, &mut rng);
    for pairing in &day_two.pairs {
        let division = league.registry.get(pairing.east).unwrap().division;
        assert!(division.is_elite(), "{division} fought on an even day");
    }
}

#[test]
fn same_seed_schedules_identically() {
    let config = LeagueConfig::default();
    let league = LeagueBuilder::new(&config).build();
    let run = || {
        let mut faced = FacedSet::new();
        let mut rng = Rng::new(99);
        (1..=5)
            .map(|day| schedule_day(&league.registry, &mut faced, day, &config, &mut rng))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn late_phase_leaders_meet_each_other() {
    let config = ScheduleConfig::default();
    let mut faced = FacedSet::new();
    let mut rng = Rng::new(5);

    let mut pool: Vec<Entrant> = (1..=10).map(|i| entrant(i, i as u16, i)).collect();
    for e in &mut pool {
        e.wins = 5;
        e.losses = 8;
    }
    pool[6].wins = 12;
    pool[6].losses = 1;
    pool[9].wins = 11;
    pool[9].losses = 2;

    let result = schedule_division(&pool, &mut faced, 14, &config, &mut rng);
    assert!(result
        .pairs
        .iter()
        .any(|p| p.involves(CompetitorId(7)) && p.involves(CompetitorId(10))));
}

#[test]
fn seam_pairs_bottom_of_upper_with_top_of_lower() {
    let config = ScheduleConfig::default();
    let mut faced = FacedSet::new();
    let mut upper = entrant(1, 1, 28);
    upper.division = Division::Juryo;
    let lower_top = entrant(2, 2, 1);
    let lower_deep = entrant(3, 3, 90);

    let mut leftovers = BTreeMap::new();
    leftovers.insert(Division::Juryo, vec![upper]);
    leftovers.insert(Division::Makushita, vec![lower_top, lower_deep]);
    let mut context = BoundaryContext {
        day: 1,
        ..BoundaryContext::default()
    };
    context.headcounts.insert(Division::Juryo, 28);
    context.headcounts.insert(Division::Makushita, 120);

    let (pairs, activations) =
        schedule_boundaries(&mut leftovers, &mut faced, &context, &config);

    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].involves(CompetitorId(1)) && pairs[0].involves(CompetitorId(2)));
    assert_eq!(pairs[0].east, CompetitorId(1));
    assert!(faced.has_faced(CompetitorId(1), CompetitorId(2)));
    assert_eq!(activations.len(), 1);
    assert!(activations[0]
        .reasons
        .contains(&ActivationReason::MutualShortage));
    assert_eq!(leftovers[&Division::Juryo].len(), 0);
    assert_eq!(leftovers[&Division::Makushita].len(), 1);
}
