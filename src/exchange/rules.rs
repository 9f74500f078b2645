//! Seam rules: how a record translates into promotion or demotion pressure.
//!
//! Scores live on one ladder shared by both sides of a seam: the projected
//! distance above the seam, in rank numbers, after applying the record.
//! Positive means the competitor belongs in the upper division next time.

use serde::Serialize;

use crate::config::{RuleKind, SeamRuleConfig};

/// A competitor's record and position as a rule sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Standing {
    /// Banzuke number within the current division, 1 is the top.
    pub number: u32,
    pub wins: u32,
    /// Losses plus absences.
    pub losses: u32,
    /// Bouts scheduled per tournament in the current division.
    pub bouts: u32,
    /// Rank numbers in the current division.
    pub division_numbers: u32,
}

impl Standing {
    pub fn net_wins(&self) -> i64 {
        i64::from(self.wins) - i64::from(self.losses)
    }

    pub fn is_winning_record(&self) -> bool {
        self.wins > self.losses
    }

    pub fn is_losing_record(&self) -> bool {
        self.losses > self.wins
    }

    pub fn is_perfect(&self) -> bool {
        self.bouts > 0 && self.wins >= self.bouts && self.losses == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub mandatory: bool,
    pub borderline: bool,
    pub score: f64,
}

impl Verdict {
    pub fn is_candidate(&self) -> bool {
        self.mandatory || self.borderline
    }

    /// Same score, stripped of both flags.
    pub fn score_only(&self) -> Self {
        Self {
            mandatory: false,
            borderline: false,
            score: self.score,
        }
    }
}

pub trait ExchangeRule: Send + Sync {
    /// Applied to upper-side competitors. A low score argues for demotion.
    fn demotion(&self, standing: &Standing) -> Verdict;
    /// Applied to lower-side competitors. A high score argues for promotion.
    fn promotion(&self, standing: &Standing) -> Verdict;
}

/// Projects each record along the ladder: net losses push an upper-side
/// competitor toward and past the bottom of the division, net wins pull a
/// lower-side competitor toward and past the top.
///
/// Depth scales the threshold: the deeper the rank, the fewer net losses it
/// takes to cross the seam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionRule {
    pub upper_drop_per_loss: f64,
    pub lower_climb_per_win: f64,
    pub borderline_window: f64,
}

impl ProjectionRule {
    pub fn from_config(config: &SeamRuleConfig) -> Self {
        Self {
            upper_drop_per_loss: config.upper_drop_per_loss,
            lower_climb_per_win: config.lower_climb_per_win,
            borderline_window: config.borderline_window,
        }
    }
}

impl ExchangeRule for ProjectionRule {
    fn demotion(&self, standing: &Standing) -> Verdict {
        let deficit = -standing.net_wins() as f64;
        let projected = f64::from(standing.number) + deficit * self.upper_drop_per_loss;
        let score = f64::from(standing.division_numbers) - projected + 0.5;
        let losing = standing.is_losing_record();
        let mandatory = losing && score < 0.0;
        Verdict {
            mandatory,
            borderline: !mandatory && losing && score < self.borderline_window,
            score,
        }
    }

    fn promotion(&self, standing: &Standing) -> Verdict {
        let surplus = standing.net_wins() as f64;
        let projected = f64::from(standing.number) - surplus * self.lower_climb_per_win;
        let score = 0.5 - projected;
        let winning = standing.is_winning_record();
        let mandatory = winning && score > 0.0;
        Verdict {
            mandatory,
            borderline: !mandatory && winning && score > -self.borderline_window,
            score,
        }
    }
}

/// Projection rule plus the entry rules into the salaried ranks: a perfect
/// record near the top of the lower division is always mandatory, and any
/// winning record at the very top is at least borderline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SekitoriRule {
    pub projection: ProjectionRule,
    pub perfect_record_reach: u32,
    pub winning_record_reach: u32,
}

impl SekitoriRule {
    pub const PERFECT_RECORD_REACH: u32 = 15;
    pub const WINNING_RECORD_REACH: u32 = 5;

    pub fn from_config(config: &SeamRuleConfig) -> Self {
        Self {
            projection: ProjectionRule::from_config(config),
            perfect_record_reach: Self::PERFECT_RECORD_REACH,
            winning_record_reach: Self::WINNING_RECORD_REACH,
        }
    }
}

impl ExchangeRule for SekitoriRule {
    fn demotion(&self, standing: &Standing) -> Verdict {
        self.projection.demotion(standing)
    }

    fn promotion(&self, standing: &Standing) -> Verdict {
        let mut verdict = self.projection.promotion(standing);
        if standing.is_perfect() && standing.number <= self.perfect_record_reach {
            verdict.mandatory = true;
            verdict.borderline = false;
            verdict.score = verdict.score.max(1.0);
        } else if !verdict.mandatory
            && standing.is_winning_record()
            && standing.number <= self.winning_record_reach
        {
            verdict.borderline = true;
        }
        verdict
    }
}

/// Builds the rule configured for a seam.
pub fn rule_for(config: &SeamRuleConfig) -> Box<dyn ExchangeRule> {
    match config.kind {
        RuleKind::Projection => Box::new(ProjectionRule::from_config(config)),
        RuleKind::Sekitori => Box::new(SekitoriRule::from_config(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(number: u32, wins: u32, losses: u32, bouts: u32, division_numbers: u32) -> Standing {
        Standing {
            number,
            wins,
            losses,
            bouts,
            division_numbers,
        }
    }

    const ELITE: ProjectionRule = ProjectionRule {
        upper_drop_per_loss: 1.0,
        lower_climb_per_win: 1.0,
        borderline_window: 2.0,
    };

    #[test]
    fn bottom_rank_losing_record_is_mandatory_demotion() {
        let verdict = ELITE.demotion(&standing(21, 7, 8, 15, 21));
        assert!(verdict.mandatory);
        assert!(verdict.score < 0.0);
    }

    #[test]
    fn depth_scales_the_demotion_threshold() {
        // Four numbers from the bottom, one net loss is not enough.
        let shallow = ELITE.demotion(&standing(17, 7, 8, 15, 21));
        assert!(!shallow.mandatory);
        // Five net losses from the same position are.
        let deep = ELITE.demotion(&standing(17, 5, 10, 15, 21));
        assert!(deep.mandatory);
    }

    #[test]
    fn winning_record_is_never_a_demotion_candidate() {
        let verdict = ELITE.demotion(&standing(21, 8, 7, 15, 21));
        assert!(!verdict.is_candidate());
    }

    #[test]
    fn top_rank_winning_record_is_mandatory_promotion() {
        let verdict = ELITE.promotion(&standing(1, 9, 6, 15, 14));
        assert!(verdict.mandatory);
        let borderline = ELITE.promotion(&standing(4, 9, 6, 15, 14));
        assert!(!borderline.mandatory);
        assert!(borderline.borderline);
    }

    #[test]
    fn sekitori_perfect_record_reaches_deeper() {
        let rule = SekitoriRule {
            projection: ProjectionRule {
                upper_drop_per_loss: 1.0,
                lower_climb_per_win: 1.0,
                borderline_window: 2.0,
            },
            perfect_record_reach: 15,
            winning_record_reach: 5,
        };
        let perfect = rule.promotion(&standing(14, 7, 0, 7, 60));
        assert!(perfect.mandatory);
        let top_winner = rule.promotion(&standing(5, 4, 3, 7, 60));
        assert!(top_winner.borderline);
        let deep_winner = rule.promotion(&standing(20, 4, 3, 7, 60));
        assert!(!deep_winner.is_candidate());
    }
}
