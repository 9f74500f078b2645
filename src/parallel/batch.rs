//! Batch driver for many independent careers.
//!
//! Each career gets its own league, config seed, and random streams, so the
//! results for a seed do not depend on worker count or scheduling order.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::LeagueConfig;
use crate::error::EngineError;
use crate::league::Division;
use crate::parallel::pool::WorkerPool;
use crate::sim::Simulation;

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use basho::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + usize::from(i < remainder);
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Where a tracked career ended and how it got there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerSummary {
    pub seed: u64,
    pub cycles: u32,
    pub final_division: Division,
    pub final_rank_score: u32,
    /// Highest division reached at the end of any cycle.
    pub peak_division: Division,
    pub promotions: u32,
    pub demotions: u32,
    pub total_wins: u32,
    pub total_losses: u32,
}

/// Runs one tracked career of `cycles` tournaments.
pub fn run_career(config: &LeagueConfig, seed: u64, cycles: u32) -> Result<CareerSummary, EngineError> {
    let mut config = config.clone();
    config.seed = seed;
    let mut simulation = Simulation::seeded(config);

    let mut summary = CareerSummary {
        seed,
        cycles,
        final_division: Division::Jonokuchi,
        final_rank_score: 0,
        peak_division: Division::Jonokuchi,
        promotions: 0,
        demotions: 0,
        total_wins: 0,
        total_losses: 0,
    };
    for _ in 0..cycles {
        let report = simulation.run_cycle()?;
        if let Some(line) = report.player {
            summary.final_division = line.division;
            summary.final_rank_score = line.rank_score;
            summary.peak_division = summary.peak_division.min(line.division);
            summary.promotions += u32::from(line.promoted);
            summary.demotions += u32::from(line.demoted);
            summary.total_wins += line.wins;
            summary.total_losses += line.losses + line.absences;
        }
    }
    Ok(summary)
}

/// Runs one career per seed on `pool`, one contiguous batch of seeds per
/// worker thread. Output order follows `seeds`.
pub fn run_careers(
    config: &LeagueConfig,
    seeds: &[u64],
    cycles: u32,
    pool: &WorkerPool,
) -> Result<Vec<CareerSummary>, EngineError> {
    pool.install(|| {
        let batches = batch_ranges(seeds.len(), rayon::current_num_threads());
        let chunks = batches
            .into_par_iter()
            .map(|(start, end)| run_careers_sequential(config, &seeds[start..end], cycles))
            .collect::<Result<Vec<_>, _>>()?;
        Ok::<_, EngineError>(chunks.into_iter().flatten().collect())
    })?
}

/// Sequential counterpart of [run_careers], for comparison and benches.
pub fn run_careers_sequential(
    config: &LeagueConfig,
    seeds: &[u64],
    cycles: u32,
) -> Result<Vec<CareerSummary>, EngineError> {
    seeds
        .iter()
        .map(|seed| run_career(config, *seed, cycles))
        .collect()
}

/// Seeds for `careers` careers derived from one base seed.
pub fn career_seeds(base: u64, careers: usize) -> Vec<u64> {
    (0..careers as u64)
        .map(|i| crate::sim::rng::mix64(base ^ i.wrapping_mul(0x9e37_79b9_7f4a_7c15)))
        .collect()
}
