//! Retirement, intake, and absence: the collaborators that mutate the
//! registry around a tournament. Their mutations are complete before the
//! reconciler runs.

use serde::Serialize;
use tracing::debug;

use crate::config::LeagueConfig;
use crate::league::{CompetitorId, Division, LeagueRegistry};
use crate::population::PoolRecruiter;
use crate::sim::rng::Rng;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleReport {
    pub retired: Vec<CompetitorId>,
    pub recruited: Vec<CompetitorId>,
}

pub trait Lifecycle {
    /// Marks competitors sitting out the coming tournament. Returns their ids.
    fn before_tournament(
        &mut self,
        registry: &mut LeagueRegistry,
        tracked: Option<CompetitorId>,
    ) -> Vec<CompetitorId>;

    /// Retires and enlists competitors. `tracked` is never retired.
    fn after_tournament(
        &mut self,
        registry: &mut LeagueRegistry,
        tracked: Option<CompetitorId>,
    ) -> LifecycleReport;
}

/// Flat-rate retirement and absence with a fixed intake per cycle.
#[derive(Debug, Clone)]
pub struct SeededLifecycle {
    rng: Rng,
    retire_rate: f64,
    kyujo_rate: f64,
    intake_per_cycle: usize,
    recruiter: PoolRecruiter,
}

impl SeededLifecycle {
    pub fn new(rng: Rng, config: &LeagueConfig) -> Self {
        let recruiter = PoolRecruiter::new(
            rng.fork(0x1a7e),
            config.stable_count,
            config.division(Division::Maezumo).base_ability,
        );
        Self {
            rng,
            retire_rate: config.retire_rate,
            kyujo_rate: config.kyujo_rate,
            intake_per_cycle: config.intake_per_cycle,
            recruiter,
        }
    }
}

impl Lifecycle for SeededLifecycle {
    fn before_tournament(
        &mut self,
        registry: &mut LeagueRegistry,
        _tracked: Option<CompetitorId>,
    ) -> Vec<CompetitorId> {
        let mut absent = Vec::new();
        for competitor in registry
            .iter_mut()
            .filter(|c| c.active && !c.division.is_entry_pool())
        {
            if self.rng.chance(self.kyujo_rate) {
                competitor.kyujo = true;
                absent.push(competitor.id);
            }
        }
        debug!(absent = absent.len(), "absences drawn");
        absent
    }

    fn after_tournament(
        &mut self,
        registry: &mut LeagueRegistry,
        tracked: Option<CompetitorId>,
    ) -> LifecycleReport {
        let candidates: Vec<CompetitorId> = registry
            .iter()
            .filter(|c| c.active && Some(c.id) != tracked)
            .map(|c| c.id)
            .collect();
        let mut report = LifecycleReport::default();
        for id in candidates {
            if self.rng.chance(self.retire_rate) && registry.retire(id) {
                report.retired.push(id);
            }
        }
        for _ in 0..self.intake_per_cycle {
            report.recruited.push(self.recruiter.enlist(registry));
        }
        debug!(
            retired = report.retired.len(),
            recruited = report.recruited.len(),
            "lifecycle applied"
        );
        report
    }
}
