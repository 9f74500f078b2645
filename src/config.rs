//! League configuration: headcount policies, bout calendars, scheduling and exchange knobs.
//!
//! Every field has a default, so a config file only needs the values it overrides.
//! Files are read as YAML, which also accepts JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::league::{BoundaryId, Division, HeadcountPolicy};

/// Environment variable naming the config file used by the CLI.
pub const CONFIG_ENV_VAR: &str = "BASHO_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    pub seed: u64,
    pub tournament_days: u32,
    pub stable_count: u16,
    /// Newcomers placed in the entry pool when a league is first built.
    pub entry_pool_initial: usize,
    pub intake_per_cycle: usize,
    pub retire_rate: f64,
    pub kyujo_rate: f64,
    pub divisions: Vec<DivisionConfig>,
    pub schedule: ScheduleConfig,
    pub exchange: ExchangeConfig,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            tournament_days: 15,
            stable_count: 44,
            entry_pool_initial: 24,
            intake_per_cycle: 18,
            retire_rate: 0.025,
            kyujo_rate: 0.01,
            divisions: DivisionConfig::defaults(),
            schedule: ScheduleConfig::default(),
            exchange: ExchangeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionConfig {
    pub division: Division,
    pub policy: HeadcountPolicy,
    /// Bouts per competitor per tournament. Short calendars fight on odd days.
    pub bouts: u32,
    /// How far one net win moves a competitor on the next banzuke, in rank-score steps.
    pub rank_shift_per_win: f64,
    /// Mean ability of members created by the league builder.
    pub base_ability: f64,
}

impl DivisionConfig {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(Division::Makuuchi, HeadcountPolicy::fixed(42), 15, 2.0, 90.0),
            Self::new(Division::Juryo, HeadcountPolicy::fixed(28), 15, 2.0, 80.0),
            Self::new(
                Division::Makushita,
                HeadcountPolicy::banded(110, 120, 130),
                7,
                8.0,
                70.0,
            ),
            Self::new(
                Division::Sandanme,
                HeadcountPolicy::banded(160, 180, 200),
                7,
                12.0,
                60.0,
            ),
            Self::new(
                Division::Jonidan,
                HeadcountPolicy::banded(170, 200, 230),
                7,
                14.0,
                50.0,
            ),
            Self::new(
                Division::Jonokuchi,
                HeadcountPolicy::banded(30, 60, 90),
                7,
                6.0,
                40.0,
            ),
            Self::new(
                Division::Maezumo,
                HeadcountPolicy::banded(0, 0, usize::MAX),
                0,
                0.0,
                35.0,
            ),
        ]
    }

    fn new(
        division: Division,
        policy: HeadcountPolicy,
        bouts: u32,
        rank_shift_per_win: f64,
        base_ability: f64,
    ) -> Self {
        Self {
            division,
            policy,
            bouts,
            rank_shift_per_win,
            base_ability,
        }
    }

    fn fallback(division: Division) -> Self {
        Self::defaults()
            .into_iter()
            .find(|cfg| cfg.division == division)
            .unwrap_or_else(|| {
                Self::new(division, HeadcountPolicy::banded(0, 0, usize::MAX), 0, 0.0, 0.0)
            })
    }
}

impl LeagueConfig {
    /// Config for `division`; divisions missing from the file use the built-in defaults.
    pub fn division(&self, division: Division) -> DivisionConfig {
        self.divisions
            .iter()
            .find(|cfg| cfg.division == division)
            .cloned()
            .unwrap_or_else(|| DivisionConfig::fallback(division))
    }

    pub fn policy(&self, division: Division) -> HeadcountPolicy {
        self.division(division).policy
    }

    pub fn bouts(&self, division: Division) -> u32 {
        self.division(division).bouts
    }

    /// Whether `division` has bouts scheduled on `day`.
    ///
    /// Full calendars fight every day; shorter ones fight on odd days until
    /// their bout count is used up. The entry pool never fights.
    pub fn fights_on(&self, division: Division, day: u32) -> bool {
        let bouts = self.bouts(division);
        if bouts == 0 || day == 0 || day > self.tournament_days {
            return false;
        }
        if bouts >= self.tournament_days {
            return true;
        }
        day % 2 == 1 && (day + 1) / 2 <= bouts
    }

    /// Checks internal consistency; returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();
        if self.tournament_days == 0 {
            issues.push("tournament_days must be at least 1".to_string());
        }
        if self.stable_count == 0 {
            issues.push("stable_count must be at least 1".to_string());
        }
        for division in Division::RANKED {
            let cfg = self.division(division);
            let policy = cfg.policy;
            if policy.min > policy.target || policy.target > policy.max {
                issues.push(format!(
                    "{division}: expected min <= target <= max, got {} / {} / {}",
                    policy.min, policy.target, policy.max
                ));
            }
            if policy.fixed && (policy.min != policy.target || policy.max != policy.target) {
                issues.push(format!(
                    "{division}: fixed divisions need min == target == max"
                ));
            }
            if division.is_elite() && !policy.fixed {
                issues.push(format!("{division}: elite divisions must be fixed-size"));
            }
            if cfg.bouts == 0 {
                issues.push(format!("{division}: ranked divisions need at least one bout"));
            }
            if cfg.bouts > self.tournament_days {
                issues.push(format!(
                    "{division}: {} bouts do not fit in {} days",
                    cfg.bouts, self.tournament_days
                ));
            }
        }
        if self.schedule.early_last_day > self.schedule.mid_last_day {
            issues.push("schedule: early phase must end before the mid phase".to_string());
        }
        for seam in &self.schedule.boundaries {
            if seam.boundary.upper.below() != Some(seam.boundary.lower) {
                issues.push(format!("schedule: {} is not an adjacent seam", seam.boundary));
            }
        }
        for rule in &self.exchange.rules {
            if rule.boundary.upper.below() != Some(rule.boundary.lower) {
                issues.push(format!("exchange: {} is not an adjacent seam", rule.boundary));
            }
        }
        if !(0.0..=1.0).contains(&self.retire_rate) || !(0.0..=1.0).contains(&self.kyujo_rate) {
            issues.push("retire_rate and kyujo_rate must be probabilities".to_string());
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Last day of the early (rank-proximity) phase.
    pub early_last_day: u32,
    /// Last day of the mid (win-count) phase.
    pub mid_last_day: u32,
    pub small_pool_limit: usize,
    pub small_pool_attempts: usize,
    pub medium_pool_limit: usize,
    pub medium_pool_attempts: usize,
    pub large_pool_attempts: usize,
    /// Late phase: leaders within this many wins of the top are paired first.
    pub leader_win_window: u32,
    pub leader_cluster_size: usize,
    pub leader_min_pool: usize,
    /// Seams eligible for cross-division bouts, highest priority first.
    pub boundaries: Vec<BoundarySchedule>,
    pub late_evaluation_day: u32,
    pub runaway_gap: u32,
    pub max_widenings: u32,
    /// Rank numbers added to a band per widening.
    pub widen_step: u32,
    pub vacancy_bonus: f64,
    /// Need weight per win the lower candidate leads the upper one by.
    pub pressure_bonus: f64,
    pub late_bonus: f64,
    /// Cross-division pairs costing more than this after need weighting are not made.
    pub max_boundary_cost: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            early_last_day: 5,
            mid_last_day: 9,
            small_pool_limit: 60,
            small_pool_attempts: 24,
            medium_pool_limit: 120,
            medium_pool_attempts: 12,
            large_pool_attempts: 6,
            leader_win_window: 1,
            leader_cluster_size: 12,
            leader_min_pool: 8,
            boundaries: BoundarySchedule::defaults(),
            late_evaluation_day: 13,
            runaway_gap: 2,
            max_widenings: 8,
            widen_step: 2,
            vacancy_bonus: 40.0,
            pressure_bonus: 15.0,
            late_bonus: 20.0,
            max_boundary_cost: 200.0,
        }
    }
}

impl ScheduleConfig {
    /// Number of greedy attempts for a pool of `pool_size` competitors.
    pub fn attempts_for(&self, pool_size: usize) -> usize {
        let attempts = if pool_size <= self.small_pool_limit {
            self.small_pool_attempts
        } else if pool_size <= self.medium_pool_limit {
            self.medium_pool_attempts
        } else {
            self.large_pool_attempts
        };
        attempts.max(1)
    }
}

/// Cross-division pairing window at one seam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySchedule {
    pub boundary: BoundaryId,
    /// Bottom rank numbers of the upper division considered first.
    pub upper_band: u32,
    /// Top rank numbers of the lower division considered first.
    pub lower_band: u32,
}

impl BoundarySchedule {
    pub fn defaults() -> Vec<Self> {
        let seam = |upper, lower, upper_band, lower_band| Self {
            boundary: BoundaryId { upper, lower },
            upper_band,
            lower_band,
        };
        vec![
            seam(Division::Juryo, Division::Makushita, 3, 5),
            seam(Division::Makuuchi, Division::Juryo, 3, 3),
            seam(Division::Makushita, Division::Sandanme, 5, 10),
            seam(Division::Sandanme, Division::Jonidan, 5, 10),
            seam(Division::Jonidan, Division::Jonokuchi, 5, 10),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Promotion/demotion score gap that forces a single slot when no candidate is mandatory.
    pub force_threshold: f64,
    /// Score gap required to extend the exchange by one more slot.
    pub extend_margin: f64,
    /// Members taken from each side of a seam when neither side has natural candidates.
    pub fallback_depth: usize,
    pub rules: Vec<SeamRuleConfig>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            force_threshold: 5.0,
            extend_margin: 2.5,
            fallback_depth: 3,
            rules: SeamRuleConfig::defaults(),
        }
    }
}

impl ExchangeConfig {
    pub fn rule_config(&self, boundary: BoundaryId) -> SeamRuleConfig {
        self.rules
            .iter()
            .find(|rule| rule.boundary == boundary)
            .cloned()
            .unwrap_or_else(|| SeamRuleConfig::fallback(boundary))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Project each record onto a ladder across the seam.
    Projection,
    /// Projection plus the senior-entry rules for the top of the lower division.
    Sekitori,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeamRuleConfig {
    pub boundary: BoundaryId,
    pub kind: RuleKind,
    /// Rank numbers an upper-side competitor falls per net loss.
    pub upper_drop_per_loss: f64,
    /// Rank numbers a lower-side competitor climbs per net win.
    pub lower_climb_per_win: f64,
    /// Distance from the seam, in rank numbers, inside which a losing/winning record is borderline.
    pub borderline_window: f64,
}

impl SeamRuleConfig {
    pub fn defaults() -> Vec<Self> {
        let rule = |upper, lower, kind, drop, climb, window| Self {
            boundary: BoundaryId { upper, lower },
            kind,
            upper_drop_per_loss: drop,
            lower_climb_per_win: climb,
            borderline_window: window,
        };
        vec![
            rule(Division::Makuuchi, Division::Juryo, RuleKind::Projection, 1.0, 1.0, 2.0),
            rule(Division::Juryo, Division::Makushita, RuleKind::Sekitori, 1.0, 3.0, 2.0),
            rule(Division::Makushita, Division::Sandanme, RuleKind::Projection, 4.0, 8.0, 6.0),
            rule(Division::Sandanme, Division::Jonidan, RuleKind::Projection, 6.0, 10.0, 8.0),
            rule(Division::Jonidan, Division::Jonokuchi, RuleKind::Projection, 7.0, 8.0, 8.0),
        ]
    }

    fn fallback(boundary: BoundaryId) -> Self {
        Self::defaults()
            .into_iter()
            .find(|rule| rule.boundary == boundary)
            .unwrap_or(Self {
                boundary,
                kind: RuleKind::Projection,
                upper_drop_per_loss: 4.0,
                lower_climb_per_win: 4.0,
                borderline_window: 4.0,
            })
    }
}

/// Loads a config file. JSON files parse too, since JSON is valid YAML.
pub fn load_config(path: impl AsRef<Path>) -> Result<LeagueConfig, EngineError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;
    let config: LeagueConfig =
        serde_yaml::from_str(&raw).map_err(|source| EngineError::ConfigParse {
            path: path.display().to_string(),
            source,
        })?;
    config
        .validate()
        .map_err(|issues| EngineError::InvalidConfig(issues.join("; ")))?;
    Ok(config)
}
