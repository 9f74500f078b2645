//! Newcomer intake into the entry pool.

use crate::league::{Competitor, CompetitorId, Division, LeagueRegistry, StableId};
use crate::sim::rng::Rng;

const PREFIXES: [&str; 16] = [
    "Asa", "Haku", "Taka", "Koto", "Waka", "Tochi", "Kiri", "Hoku", "Toyo", "Tama", "Kita", "Teru",
    "Ura", "Mitake", "Oki", "Kai",
];
const SUFFIXES: [&str; 12] = [
    "fuji", "ryu", "nishiki", "umi", "yama", "shima", "zakura", "sho", "kaze", "maru", "hikari",
    "nohana",
];

/// Width of the ability band newcomers are drawn from.
const ABILITY_SPREAD: f64 = 15.0;

/// Ring name drawn from fixed syllable tables.
pub fn generate_shikona(rng: &mut Rng) -> String {
    let prefix = PREFIXES[rng.next_below(PREFIXES.len() as u64) as usize];
    let suffix = SUFFIXES[rng.next_below(SUFFIXES.len() as u64) as usize];
    format!("{prefix}{suffix}")
}

/// Supplies new competitors to the entry pool when the reconciler runs dry.
pub trait Recruiter {
    /// Registers one newcomer in the entry pool and returns its id, or `None`
    /// if the recruiter has nobody left to offer.
    fn recruit(&mut self, registry: &mut LeagueRegistry) -> Option<CompetitorId>;
}

/// Unlimited recruiter creating entry-pool members with randomized ability.
#[derive(Debug, Clone)]
pub struct PoolRecruiter {
    rng: Rng,
    stable_count: u16,
    base_ability: f64,
}

impl PoolRecruiter {
    pub fn new(rng: Rng, stable_count: u16, base_ability: f64) -> Self {
        Self {
            rng,
            stable_count: stable_count.max(1),
            base_ability,
        }
    }

    /// Builds and registers one newcomer.
    pub fn enlist(&mut self, registry: &mut LeagueRegistry) -> CompetitorId {
        let id = registry.allocate_id();
        let stable = StableId(self.rng.next_below(u64::from(self.stable_count)) as u16);
        let ability = self.base_ability + (self.rng.next_f64() - 0.5) * ABILITY_SPREAD;
        let rank_score = u32::try_from(registry.active_count(Division::Maezumo) + 1)
            .unwrap_or(u32::MAX);
        let shikona = generate_shikona(&mut self.rng);
        registry.insert(Competitor::new(
            id,
            shikona,
            stable,
            Division::Maezumo,
            rank_score,
            ability,
        ))
    }
}

impl Recruiter for PoolRecruiter {
    fn recruit(&mut self, registry: &mut LeagueRegistry) -> Option<CompetitorId> {
        Some(self.enlist(registry))
    }
}
