//! Cross-division pairing at division seams.
//!
//! Runs after in-division pairing. For each configured seam, in priority
//! order, leftover competitors near the bottom of the upper division may be
//! matched against leftovers near the top of the lower one, if at least one
//! activation reason holds.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::config::{BoundarySchedule, ScheduleConfig};
use crate::league::{rank_number, BoundaryId, Division};
use crate::schedule::faced::FacedSet;
use crate::schedule::pairing::{oriented, Pairing, PairingStage};
use crate::schedule::phase::{Entrant, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationReason {
    /// The upper division is below its fixed headcount.
    Vacancy,
    /// Both sides have leftovers.
    MutualShortage,
    /// Some upper/lower leftover pair is within one win.
    ScoreAlignment,
    /// The tournament has reached the late evaluation day.
    LateEvaluation,
    /// The best lower leftover is well ahead of the weakest upper one.
    Runaway,
}

/// Attached to every cross-division pair for downstream diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryTag {
    pub boundary: BoundaryId,
    pub reasons: Vec<ActivationReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryActivation {
    pub day: u32,
    pub boundary: BoundaryId,
    pub reasons: Vec<ActivationReason>,
    pub pairs: usize,
}

/// League facts for the day that the boundary pass needs.
#[derive(Debug, Clone, Default)]
pub struct BoundaryContext {
    pub day: u32,
    /// Fixed-size divisions currently short of their target.
    pub vacancies: BTreeSet<Division>,
    /// Active headcount per division.
    pub headcounts: BTreeMap<Division, u32>,
}

/// Every reason to open the seam today; empty means it stays closed.
pub fn activation_reasons(
    upper: &[Entrant],
    lower: &[Entrant],
    vacancy: bool,
    day: u32,
    config: &ScheduleConfig,
) -> Vec<ActivationReason> {
    let mut reasons = Vec::new();
    if vacancy {
        reasons.push(ActivationReason::Vacancy);
    }
    if !upper.is_empty() && !lower.is_empty() {
        reasons.push(ActivationReason::MutualShortage);
    }
    let aligned = upper
        .iter()
        .any(|u| lower.iter().any(|l| u.wins.abs_diff(l.wins) <= 1));
    if aligned {
        reasons.push(ActivationReason::ScoreAlignment);
    }
    if day >= config.late_evaluation_day {
        reasons.push(ActivationReason::LateEvaluation);
    }
    let weakest_upper = upper.iter().map(|e| e.wins).min();
    let best_lower = lower.iter().map(|e| e.wins).max();
    if let (Some(weakest), Some(best)) = (weakest_upper, best_lower) {
        if best >= weakest + config.runaway_gap {
            reasons.push(ActivationReason::Runaway);
        }
    }
    reasons
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeamSide {
    Upper,
    Lower,
}

/// Positions in `side` inside the seam band, widening outward while empty.
/// Falls back to the single closest-ranked competitor.
fn band_candidates(
    side: &[Entrant],
    which: SeamSide,
    band: u32,
    division_numbers: u32,
    config: &ScheduleConfig,
) -> Vec<usize> {
    for widening in 0..=config.max_widenings {
        let width = band + widening * config.widen_step;
        let picked: Vec<usize> = side
            .iter()
            .enumerate()
            .filter(|(_, e)| match which {
                SeamSide::Upper => e.rank_number() > division_numbers.saturating_sub(width),
                SeamSide::Lower => e.rank_number() <= width,
            })
            .map(|(i, _)| i)
            .collect();
        if !picked.is_empty() {
            return picked;
        }
    }
    let closest = match which {
        SeamSide::Upper => side.iter().enumerate().max_by_key(|(_, e)| (e.rank_score, e.id)),
        SeamSide::Lower => side
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| (e.rank_score, e.id)),
    };
    closest.map(|(i, _)| vec![i]).unwrap_or_default()
}

fn need_weight(
    upper: &Entrant,
    lower: &Entrant,
    vacancy: bool,
    day: u32,
    config: &ScheduleConfig,
) -> f64 {
    let mut weight = 0.0;
    if vacancy {
        weight += config.vacancy_bonus;
    }
    weight += config.pressure_bonus * f64::from(lower.wins.saturating_sub(upper.wins));
    if day >= config.late_evaluation_day {
        weight += config.late_bonus;
    }
    weight
}

/// Pairs leftovers across seams. Paired competitors are removed from
/// `leftovers` and recorded in `faced`.
pub fn schedule_boundaries(
    leftovers: &mut BTreeMap<Division, Vec<Entrant>>,
    faced: &mut FacedSet,
    context: &BoundaryContext,
    config: &ScheduleConfig,
) -> (Vec<Pairing>, Vec<BoundaryActivation>) {
    let mut pairs = Vec::new();
    let mut activations = Vec::new();

    for seam in &config.boundaries {
        let boundary = seam.boundary;
        let has_both = leftovers.get(&boundary.upper).is_some_and(|v| !v.is_empty())
            && leftovers.get(&boundary.lower).is_some_and(|v| !v.is_empty());
        if !has_both {
            continue;
        }
        let upper = leftovers.remove(&boundary.upper).unwrap_or_default();
        let lower = leftovers.remove(&boundary.lower).unwrap_or_default();

        let vacancy = context.vacancies.contains(&boundary.upper);
        let reasons = activation_reasons(&upper, &lower, vacancy, context.day, config);
        if reasons.is_empty() {
            debug!(day = context.day, %boundary, "boundary inactive");
            leftovers.insert(boundary.upper, upper);
            leftovers.insert(boundary.lower, lower);
            continue;
        }

        let matched = pair_seam(&upper, &lower, seam, vacancy, context, faced, config);
        let tag = BoundaryTag {
            boundary,
            reasons: reasons.clone(),
        };
        let mut used_upper = vec![false; upper.len()];
        let mut used_lower = vec![false; lower.len()];
        for &(u, l) in &matched {
            used_upper[u] = true;
            used_lower[l] = true;
            faced.mark(upper[u].id, lower[l].id);
            pairs.push(oriented(
                &upper[u],
                &lower[l],
                PairingStage::Strict,
                Some(tag.clone()),
            ));
        }
        debug!(day = context.day, %boundary, pairs = matched.len(), ?reasons, "boundary active");
        activations.push(BoundaryActivation {
            day: context.day,
            boundary,
            reasons,
            pairs: matched.len(),
        });

        let keep = |side: Vec<Entrant>, used: &[bool]| -> Vec<Entrant> {
            side.into_iter()
                .zip(used.iter())
                .filter(|(_, used)| !**used)
                .map(|(e, _)| e)
                .collect()
        };
        leftovers.insert(boundary.upper, keep(upper, &used_upper));
        leftovers.insert(boundary.lower, keep(lower, &used_lower));
    }

    (pairs, activations)
}

/// Worst-ranked upper candidates choose first, each taking the cheapest valid
/// lower candidate after need weighting.
fn pair_seam(
    upper: &[Entrant],
    lower: &[Entrant],
    seam: &BoundarySchedule,
    vacancy: bool,
    context: &BoundaryContext,
    faced: &FacedSet,
    config: &ScheduleConfig,
) -> Vec<(usize, usize)> {
    let boundary = seam.boundary;
    let upper_size = context
        .headcounts
        .get(&boundary.upper)
        .copied()
        .unwrap_or_else(|| upper.iter().map(|e| e.rank_score).max().unwrap_or(0));
    let lower_size = context
        .headcounts
        .get(&boundary.lower)
        .copied()
        .unwrap_or_else(|| lower.iter().map(|e| e.rank_score).max().unwrap_or(0));

    let mut upper_pick = band_candidates(
        upper,
        SeamSide::Upper,
        seam.upper_band,
        rank_number(upper_size),
        config,
    );
    let mut lower_pick = band_candidates(
        lower,
        SeamSide::Lower,
        seam.lower_band,
        rank_number(lower_size),
        config,
    );
    upper_pick.sort_by(|&a, &b| {
        upper[b]
            .rank_score
            .cmp(&upper[a].rank_score)
            .then_with(|| upper[a].id.cmp(&upper[b].id))
    });
    lower_pick.sort_by_key(|&i| (lower[i].rank_score, lower[i].id));

    let phase = Phase::for_day(context.day, config);
    let strict = PairingStage::Strict.constraints();
    let mut taken = vec![false; lower_pick.len()];
    let mut matched = Vec::new();

    for &u in &upper_pick {
        let a = &upper[u];
        let mut best: Option<(f64, usize)> = None;
        for (position, &l) in lower_pick.iter().enumerate() {
            if taken[position] {
                continue;
            }
            let b = &lower[l];
            if !strict.permits(a, b, faced) {
                continue;
            }
            let distance = upper_size.saturating_sub(a.rank_score) + b.rank_score;
            let cost = phase.cost(a, b, distance) as f64
                - need_weight(a, b, vacancy, context.day, config);
            if cost > config.max_boundary_cost {
                continue;
            }
            if best.map_or(true, |(best_cost, _)| cost < best_cost) {
                best = Some((cost, position));
            }
        }
        if let Some((_, position)) = best {
            taken[position] = true;
            matched.push((u, lower_pick[position]));
        }
    }

    matched
}
