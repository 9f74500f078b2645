//! One tournament cycle end to end: absences, fifteen days of bouts,
//! exchange, committee, retirement and intake, reconciliation.
//!
//! The registry is owned here and lent to one phase at a time.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::config::LeagueConfig;
use crate::error::EngineError;
use crate::exchange::{
    apply_exchanges, exchange_flags, resolve_exchanges, ExchangeFlags, ExchangeOutcome,
};
use crate::league::{CompetitorId, Division, LeagueBuilder, LeagueRegistry};
use crate::population::{reconcile, PoolRecruiter, PopulationSnapshot, ReconcileReport, Recruiter};
use crate::rank::RankLayout;
use crate::schedule::{schedule_day, BoundaryActivation, FacedSet};
use crate::sim::bout::{BoutModel, LogisticBoutModel};
use crate::sim::committee::{PerformanceCommittee, RankCommittee};
use crate::sim::lifecycle::{Lifecycle, LifecycleReport, SeededLifecycle};
use crate::sim::rng::Rng;

const BOUT_STREAM: u64 = 0xb007;
const LIFECYCLE_STREAM: u64 = 0x11fe;
const RECRUIT_STREAM: u64 = 0x4ec4;

/// Tracked competitor's line after a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerLine {
    pub id: CompetitorId,
    pub active: bool,
    pub division: Division,
    pub rank_score: u32,
    pub rank: String,
    pub wins: u32,
    pub losses: u32,
    pub absences: u32,
    pub promoted: bool,
    pub demoted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub tournament: u32,
    pub bouts: usize,
    pub absent: Vec<CompetitorId>,
    pub activations: Vec<BoundaryActivation>,
    pub exchanges: Vec<ExchangeOutcome>,
    pub flags: BTreeMap<CompetitorId, ExchangeFlags>,
    pub moved: usize,
    pub lifecycle: LifecycleReport,
    pub population: ReconcileReport,
    pub snapshot: PopulationSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerLine>,
}

pub struct Simulation {
    registry: LeagueRegistry,
    config: LeagueConfig,
    rng: Rng,
    bout_model: Box<dyn BoutModel>,
    lifecycle: Box<dyn Lifecycle>,
    committee: Box<dyn RankCommittee>,
    recruiter: Option<Box<dyn Recruiter>>,
    player: Option<CompetitorId>,
    tournament: u32,
}

impl Simulation {
    /// Wraps an existing registry with the default collaborators, seeded from `config.seed`.
    pub fn new(registry: LeagueRegistry, config: LeagueConfig) -> Self {
        let root = Rng::new(config.seed);
        let lifecycle = SeededLifecycle::new(root.fork(LIFECYCLE_STREAM), &config);
        let recruiter = PoolRecruiter::new(
            root.fork(RECRUIT_STREAM),
            config.stable_count,
            config.division(Division::Maezumo).base_ability,
        );
        Self {
            registry,
            rng: root.fork(BOUT_STREAM),
            bout_model: Box::new(LogisticBoutModel::default()),
            lifecycle: Box::new(lifecycle),
            committee: Box::new(PerformanceCommittee),
            recruiter: Some(Box::new(recruiter)),
            player: None,
            tournament: 0,
            config,
        }
    }

    /// Builds a fresh league with a tracked competitor and wraps it.
    pub fn seeded(config: LeagueConfig) -> Self {
        let league = LeagueBuilder::new(&config).with_player("Player").build();
        let mut simulation = Self::new(league.registry, config);
        simulation.player = league.player;
        simulation
    }

    pub fn with_player(mut self, id: CompetitorId) -> Self {
        self.player = Some(id);
        self
    }

    pub fn with_bout_model(mut self, model: Box<dyn BoutModel>) -> Self {
        self.bout_model = model;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Box<dyn Lifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_committee(mut self, committee: Box<dyn RankCommittee>) -> Self {
        self.committee = committee;
        self
    }

    /// Disables entry-pool recruitment during reconciliation.
    pub fn without_recruitment(mut self) -> Self {
        self.recruiter = None;
        self
    }

    pub fn registry(&self) -> &LeagueRegistry {
        &self.registry
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    pub fn player(&self) -> Option<CompetitorId> {
        self.player
    }

    pub fn tournaments_run(&self) -> u32 {
        self.tournament
    }

    pub fn into_registry(self) -> LeagueRegistry {
        self.registry
    }

    /// Runs one full tournament cycle.
    ///
    /// Fails only when the tracked competitor has gone missing from the registry.
    pub fn run_cycle(&mut self) -> Result<CycleReport, EngineError> {
        self.tournament += 1;
        if let Some(id) = self.player {
            self.registry.require(id, "cycle start")?;
        }

        self.registry.begin_tournament();
        let absent = self
            .lifecycle
            .before_tournament(&mut self.registry, self.player);

        let mut faced = FacedSet::new();
        let mut activations = Vec::new();
        let mut bouts = 0;
        for day in 1..=self.config.tournament_days {
            let schedule = schedule_day(
                &self.registry,
                &mut faced,
                day,
                &self.config,
                &mut self.rng,
            );
            for id in &schedule.absent {
                if let Some(competitor) = self.registry.get_mut(*id) {
                    competitor.absences += 1;
                }
            }
            for pairing in &schedule.pairs {
                let east = self.registry.require(pairing.east, "bout")?;
                let west = self.registry.require(pairing.west, "bout")?;
                let winner = self.bout_model.simulate_bout(east, west, &mut self.rng);
                let loser = if winner == pairing.east {
                    pairing.west
                } else {
                    pairing.east
                };
                if let Some(c) = self.registry.get_mut(winner) {
                    c.wins += 1;
                }
                if let Some(c) = self.registry.get_mut(loser) {
                    c.losses += 1;
                }
            }
            bouts += schedule.pairs.len();
            activations.extend(schedule.activations);
        }

        let exchanges = resolve_exchanges(&self.registry, &self.config, self.player)?;
        let flags = exchange_flags(&exchanges);
        let moved = apply_exchanges(&mut self.registry, &exchanges);
        self.committee
            .publish(&mut self.registry, &flags, &self.config);

        let lifecycle = self
            .lifecycle
            .after_tournament(&mut self.registry, self.player);
        let recruiter = self
            .recruiter
            .as_mut()
            .map(|r| &mut **r as &mut dyn Recruiter);
        let population = reconcile(&mut self.registry, &self.config, recruiter);
        let snapshot = PopulationSnapshot::capture(&self.registry);

        let player = match self.player {
            Some(id) => Some(self.player_line(id, &exchanges)?),
            None => None,
        };

        info!(
            tournament = self.tournament,
            bouts,
            moved,
            retired = lifecycle.retired.len(),
            recruited = lifecycle.recruited.len() + population.recruits.len(),
            "cycle complete"
        );

        Ok(CycleReport {
            tournament: self.tournament,
            bouts,
            absent,
            activations,
            exchanges,
            flags,
            moved,
            lifecycle,
            population,
            snapshot,
            player,
        })
    }

    fn player_line(
        &self,
        id: CompetitorId,
        exchanges: &[ExchangeOutcome],
    ) -> Result<PlayerLine, EngineError> {
        let competitor = self.registry.require(id, "cycle report")?;
        let layout = RankLayout::for_division(
            competitor.division,
            self.registry.active_count(competitor.division),
        );
        Ok(PlayerLine {
            id,
            active: competitor.active,
            division: competitor.division,
            rank_score: competitor.rank_score,
            rank: layout.decode(competitor.rank_score).to_string(),
            wins: competitor.wins,
            losses: competitor.losses,
            absences: competitor.absences,
            promoted: exchanges.iter().any(|o| o.player_promoted),
            demoted: exchanges.iter().any(|o| o.player_demoted),
        })
    }
}
