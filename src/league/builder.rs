//! Seeds an initial league from config: every ranked division at its target
//! headcount, a starting entry pool, and optionally a tracked competitor.

use crate::config::LeagueConfig;
use crate::league::{Competitor, CompetitorId, Division, LeagueRegistry, StableId};
use crate::population::generate_shikona;
use crate::sim::rng::Rng;

const ABILITY_SPREAD: f64 = 12.0;
/// Ability drop from the top of a division to its bottom.
const ABILITY_GRADIENT: f64 = 6.0;

#[derive(Debug, Clone)]
pub struct LeagueBuilder {
    config: LeagueConfig,
    seed: u64,
    player: Option<String>,
    forbidden_pairs: usize,
}

/// A freshly built league and its tracked competitor, if any.
#[derive(Debug, Clone)]
pub struct SeededLeague {
    pub registry: LeagueRegistry,
    pub player: Option<CompetitorId>,
}

impl LeagueBuilder {
    pub fn new(config: &LeagueConfig) -> Self {
        Self {
            config: config.clone(),
            seed: config.seed,
            player: None,
            forbidden_pairs: 6,
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Adds a tracked competitor at the bottom of Jonokuchi.
    pub fn with_player(mut self, shikona: impl Into<String>) -> Self {
        self.player = Some(shikona.into());
        self
    }

    /// Number of mutually forbidden pairings seeded within divisions.
    pub fn forbidden_pairs(mut self, count: usize) -> Self {
        self.forbidden_pairs = count;
        self
    }

    pub fn build(self) -> SeededLeague {
        let mut rng = Rng::new(self.seed);
        let mut registry = LeagueRegistry::new();
        let stables = u64::from(self.config.stable_count.max(1));

        for division in Division::ALL {
            let count = if division.is_entry_pool() {
                self.config.entry_pool_initial
            } else {
                self.config.policy(division).target
            };
            let base = self.config.division(division).base_ability;
            for position in 0..count {
                let depth = position as f64 / count.max(1) as f64;
                let ability =
                    base - depth * ABILITY_GRADIENT + (rng.next_f64() - 0.5) * ABILITY_SPREAD;
                let id = registry.allocate_id();
                let stable = StableId(rng.next_below(stables) as u16);
                let shikona = generate_shikona(&mut rng);
                let rank_score = u32::try_from(position + 1).unwrap_or(u32::MAX);
                registry.insert(Competitor::new(
                    id, shikona, stable, division, rank_score, ability,
                ));
            }
        }

        for _ in 0..self.forbidden_pairs {
            seed_forbidden_pair(&mut registry, &mut rng);
        }

        let player = self.player.map(|shikona| {
            let id = registry.allocate_id();
            let division = Division::Jonokuchi;
            let rank_score =
                u32::try_from(registry.active_count(division) + 1).unwrap_or(u32::MAX);
            let stable = StableId(rng.next_below(stables) as u16);
            let ability = self.config.division(division).base_ability;
            registry.insert(Competitor::new(
                id, shikona, stable, division, rank_score, ability,
            ))
        });

        SeededLeague { registry, player }
    }
}

/// Links two random members of one ranked division as forbidden opponents.
fn seed_forbidden_pair(registry: &mut LeagueRegistry, rng: &mut Rng) {
    let division = Division::RANKED[rng.next_below(Division::RANKED.len() as u64) as usize];
    let roster = registry.roster_ids(division);
    if roster.len() < 2 {
        return;
    }
    let len = roster.len() as u64;
    let a = roster[rng.next_below(len) as usize];
    let b = roster[rng.next_below(len) as usize];
    if a == b {
        return;
    }
    if let Some(c) = registry.get_mut(a) {
        c.forbidden.insert(b);
    }
    if let Some(c) = registry.get_mut(b) {
        c.forbidden.insert(a);
    }
}
