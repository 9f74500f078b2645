//! Post-tournament promotion/demotion exchange at each division seam.
//!
//! Every seam resolves into a balanced swap: as many competitors go up as
//! come down. The one exception to ordinary scoring is the tracked
//! competitor's full-absence override, which still keeps the swap balanced.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::LeagueConfig;
use crate::error::EngineError;
use crate::exchange::rules::{rule_for, Standing, Verdict};
use crate::league::{rank_number, BoundaryId, Competitor, CompetitorId, LeagueRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateScore {
    pub id: CompetitorId,
    pub rank_score: u32,
    pub mandatory: bool,
    pub borderline: bool,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeReason {
    /// One side had no candidates, so nothing moved.
    NoCandidates,
    /// Slot count came from mandatory candidates.
    Mandatory,
    /// No mandatory candidates, but the best promotion clearly outscored the worst incumbent.
    ScoreGap,
    /// No mandatory candidates and no clear gap; one slot is still exchanged.
    Forced,
    /// Neither side had natural candidates; the loose scoring-only sets were used.
    Fallback,
    /// The tracked competitor sat out nearly the whole tournament and was demoted.
    MandatoryAbsence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeOutcome {
    pub boundary: BoundaryId,
    pub slots: usize,
    pub promoted_ids: Vec<CompetitorId>,
    pub demoted_ids: Vec<CompetitorId>,
    pub player_promoted: bool,
    pub player_demoted: bool,
    pub reason: ExchangeReason,
    /// Lower-side candidates in selection order.
    pub promotion_candidates: Vec<CandidateScore>,
    /// Upper-side candidates in selection order.
    pub demotion_candidates: Vec<CandidateScore>,
}

impl ExchangeOutcome {
    pub fn is_balanced(&self) -> bool {
        self.promoted_ids.len() == self.slots && self.demoted_ids.len() == self.slots
    }
}

/// Resolves every ranked seam, highest first. A competitor taken by one seam
/// is invisible to the seams after it.
///
/// Fails only if `player` is set and not in the registry.
pub fn resolve_exchanges(
    registry: &LeagueRegistry,
    config: &LeagueConfig,
    player: Option<CompetitorId>,
) -> Result<Vec<ExchangeOutcome>, EngineError> {
    if let Some(id) = player {
        registry.require(id, "exchange resolution")?;
    }

    let mut claimed = BTreeSet::new();
    let mut outcomes = Vec::new();
    for boundary in BoundaryId::ranked_seams() {
        let outcome = resolve_boundary(registry, boundary, config, player, &claimed);
        info!(
            %boundary,
            slots = outcome.slots,
            reason = ?outcome.reason,
            "boundary exchange resolved"
        );
        claimed.extend(outcome.promoted_ids.iter().copied());
        claimed.extend(outcome.demoted_ids.iter().copied());
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Resolves one seam, ignoring anyone in `claimed`.
pub fn resolve_boundary(
    registry: &LeagueRegistry,
    boundary: BoundaryId,
    config: &LeagueConfig,
    player: Option<CompetitorId>,
    claimed: &BTreeSet<CompetitorId>,
) -> ExchangeOutcome {
    let rule = rule_for(&config.exchange.rule_config(boundary));
    let upper_roster = registry.roster(boundary.upper);
    let lower_roster = registry.roster(boundary.lower);
    let upper_numbers = rank_number(count_u32(upper_roster.len()));
    let lower_numbers = rank_number(count_u32(lower_roster.len()));
    let upper_bouts = config.bouts(boundary.upper);
    let lower_bouts = config.bouts(boundary.lower);

    let upper: Vec<&Competitor> = upper_roster
        .into_iter()
        .filter(|c| !claimed.contains(&c.id))
        .collect();
    let lower: Vec<&Competitor> = lower_roster
        .into_iter()
        .filter(|c| !claimed.contains(&c.id))
        .collect();

    let judge_demotion =
        |c: &Competitor| rule.demotion(&standing_of(c, upper_bouts, upper_numbers));
    let judge_promotion =
        |c: &Competitor| rule.promotion(&standing_of(c, lower_bouts, lower_numbers));

    let mut demotions: Vec<CandidateScore> = upper
        .iter()
        .map(|&c| candidate(c, judge_demotion(c)))
        .filter(|c| c.mandatory || c.borderline)
        .collect();
    let mut promotions: Vec<CandidateScore> = lower
        .iter()
        .map(|&c| candidate(c, judge_promotion(c)))
        .filter(|c| c.mandatory || c.borderline)
        .collect();

    let fallback = demotions.is_empty() && promotions.is_empty();
    if fallback {
        let depth = config.exchange.fallback_depth;
        demotions = upper
            .iter()
            .rev()
            .take(depth)
            .map(|&c| candidate(c, judge_demotion(c).score_only()))
            .collect();
        promotions = lower
            .iter()
            .take(depth)
            .map(|&c| candidate(c, judge_promotion(c).score_only()))
            .collect();
        debug!(%boundary, "no natural candidates; using fallback scoring");
    }

    // A mandatory move facing an empty side: that side is filled from
    // scoring-only candidates, deep enough to cover every mandatory move.
    let mandatory = demotions
        .iter()
        .chain(&promotions)
        .filter(|c| c.mandatory)
        .count();
    if mandatory > 0 && (promotions.is_empty() || demotions.is_empty()) {
        let depth = config.exchange.fallback_depth.max(mandatory);
        if promotions.is_empty() {
            promotions = lower
                .iter()
                .take(depth)
                .map(|&c| candidate(c, judge_promotion(c).score_only()))
                .collect();
        } else {
            demotions = upper
                .iter()
                .rev()
                .take(depth)
                .map(|&c| candidate(c, judge_demotion(c).score_only()))
                .collect();
        }
        debug!(%boundary, mandatory, "one-sided seam; padding with scoring-only candidates");
    }

    demotions.sort_by(demotion_order);
    promotions.sort_by(promotion_order);

    let (slots, mut reason) = equalize_slots(&promotions, &demotions, config);
    if fallback && slots > 0 {
        reason = ExchangeReason::Fallback;
    }

    let mut promoted_ids: Vec<CompetitorId> = promotions[..slots].iter().map(|c| c.id).collect();
    let mut demoted_ids: Vec<CompetitorId> = demotions[..slots].iter().map(|c| c.id).collect();

    if let Some(id) = player {
        let absent = upper
            .iter()
            .find(|c| c.id == id)
            .is_some_and(|c| is_full_absence(c, upper_bouts));
        if absent {
            force_demotion(
                id,
                &mut promoted_ids,
                &mut demoted_ids,
                &promotions[slots..],
                &lower,
            );
            reason = ExchangeReason::MandatoryAbsence;
        }
    }

    ExchangeOutcome {
        boundary,
        slots: promoted_ids.len().min(demoted_ids.len()),
        player_promoted: player.is_some_and(|id| promoted_ids.contains(&id)),
        player_demoted: player.is_some_and(|id| demoted_ids.contains(&id)),
        promoted_ids,
        demoted_ids,
        reason,
        promotion_candidates: promotions,
        demotion_candidates: demotions,
    }
}

/// Slot count for sorted candidate lists, plus the reason it was chosen.
pub fn equalize_slots(
    promotions: &[CandidateScore],
    demotions: &[CandidateScore],
    config: &LeagueConfig,
) -> (usize, ExchangeReason) {
    let mandatory_promotions = promotions.iter().filter(|c| c.mandatory).count();
    let mandatory_demotions = demotions.iter().filter(|c| c.mandatory).count();
    let capacity = promotions.len().min(demotions.len());
    if capacity == 0 {
        return (0, ExchangeReason::NoCandidates);
    }

    let mut slots = mandatory_demotions.max(mandatory_promotions).min(capacity);
    let mut reason = ExchangeReason::Mandatory;
    if slots == 0 {
        slots = 1;
        reason = if promotions[0].score - demotions[0].score > config.exchange.force_threshold {
            ExchangeReason::ScoreGap
        } else {
            ExchangeReason::Forced
        };
    }
    while slots < capacity
        && promotions[slots].score - demotions[slots].score > config.exchange.extend_margin
    {
        slots += 1;
    }
    (slots, reason)
}

/// Zero wins and at most one bout short of losing or missing every bout.
fn is_full_absence(competitor: &Competitor, bouts: u32) -> bool {
    bouts > 0 && competitor.wins == 0 && competitor.effective_losses() + 1 >= bouts
}

/// Puts `id` on the demotion list and pads promotions to keep the swap balanced.
///
/// Padding takes the best unselected promotion candidate, then the
/// best-ranked available lower-side competitor (lowest rank score, then
/// lowest id). With nobody left to pad with, `id` replaces the last ordinary
/// demotion instead.
fn force_demotion(
    id: CompetitorId,
    promoted: &mut Vec<CompetitorId>,
    demoted: &mut Vec<CompetitorId>,
    unselected: &[CandidateScore],
    lower: &[&Competitor],
) {
    if demoted.contains(&id) {
        return;
    }
    let pad = unselected
        .iter()
        .map(|c| c.id)
        .find(|candidate| !promoted.contains(candidate))
        .or_else(|| {
            lower
                .iter()
                .filter(|c| c.is_available() && c.id != id && !promoted.contains(&c.id))
                .min_by_key(|c| (c.rank_score, c.id))
                .map(|c| c.id)
        });
    match pad {
        Some(pad) => {
            promoted.push(pad);
            demoted.push(id);
        }
        None => {
            if let Some(last) = demoted.last_mut() {
                *last = id;
            }
        }
    }
}

fn standing_of(competitor: &Competitor, bouts: u32, division_numbers: u32) -> Standing {
    Standing {
        number: competitor.rank_number(),
        wins: competitor.wins,
        losses: competitor.effective_losses(),
        bouts,
        division_numbers,
    }
}

fn candidate(competitor: &Competitor, verdict: Verdict) -> CandidateScore {
    CandidateScore {
        id: competitor.id,
        rank_score: competitor.rank_score,
        mandatory: verdict.mandatory,
        borderline: verdict.borderline,
        score: verdict.score,
    }
}

/// Mandatory first, then lowest score, then worst rank.
fn demotion_order(a: &CandidateScore, b: &CandidateScore) -> Ordering {
    b.mandatory
        .cmp(&a.mandatory)
        .then_with(|| a.score.total_cmp(&b.score))
        .then_with(|| b.rank_score.cmp(&a.rank_score))
        .then_with(|| a.id.cmp(&b.id))
}

/// Mandatory first, then highest score, then best rank.
fn promotion_order(a: &CandidateScore, b: &CandidateScore) -> Ordering {
    b.mandatory
        .cmp(&a.mandatory)
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| a.rank_score.cmp(&b.rank_score))
        .then_with(|| a.id.cmp(&b.id))
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: u32, mandatory: bool, score: f64) -> CandidateScore {
        CandidateScore {
            id: CompetitorId(id),
            rank_score: id,
            mandatory,
            borderline: !mandatory,
            score,
        }
    }

    #[test]
    fn mandatory_count_sets_slots_within_capacity() {
        let config = LeagueConfig::default();
        let promotions = vec![scored(1, true, 3.0), scored(2, true, 2.0), scored(3, false, -1.0)];
        let demotions = vec![scored(4, true, -2.0), scored(5, false, 1.0)];
        let (slots, reason) = equalize_slots(&promotions, &demotions, &config);
        assert_eq!(slots, 2);
        assert_eq!(reason, ExchangeReason::Mandatory);
    }

    #[test]
    fn score_gap_forces_one_slot_then_extends() {
        let config = LeagueConfig::default();
        let promotions = vec![scored(1, false, 4.0), scored(2, false, 3.0), scored(3, false, 0.0)];
        let demotions = vec![scored(4, false, -2.0), scored(5, false, 0.0), scored(6, false, 0.5)];
        let (slots, reason) = equalize_slots(&promotions, &demotions, &config);
        assert_eq!(reason, ExchangeReason::ScoreGap);
        // Second pair: 3.0 - 0.0 > 2.5 extends; third: 0.0 - 0.5 does not.
        assert_eq!(slots, 2);
    }

    #[test]
    fn narrow_gap_still_forces_a_single_slot() {
        let config = LeagueConfig::default();
        let promotions = vec![scored(1, false, 1.0)];
        let demotions = vec![scored(2, false, 0.5)];
        assert_eq!(
            equalize_slots(&promotions, &demotions, &config),
            (1, ExchangeReason::Forced)
        );
        assert_eq!(
            equalize_slots(&promotions, &[], &config),
            (0, ExchangeReason::NoCandidates)
        );
    }
}
