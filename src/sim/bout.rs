//! Bout outcome model. The engine treats `ability` as opaque and asks the
//! model once per scheduled pair.

use crate::league::{Competitor, CompetitorId};
use crate::sim::rng::Rng;

pub const EPSILON: f64 = 1e-9;

pub trait BoutModel: Send + Sync {
    /// Probability that `a` beats `b`, in `[0, 1]`.
    fn win_probability(&self, a: &Competitor, b: &Competitor) -> f64;

    /// Draws one bout and returns the winner's id.
    fn simulate_bout(&self, a: &Competitor, b: &Competitor, rng: &mut Rng) -> CompetitorId {
        if rng.chance(self.win_probability(a, b)) {
            a.id
        } else {
            b.id
        }
    }
}

/// Logistic curve over the ability gap: p = 1 / (1 + 10^(-(a - b) / scale)).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticBoutModel {
    pub scale: f64,
}

impl Default for LogisticBoutModel {
    fn default() -> Self {
        Self { scale: 20.0 }
    }
}

impl BoutModel for LogisticBoutModel {
    fn win_probability(&self, a: &Competitor, b: &Competitor) -> f64 {
        let scale = self.scale.max(EPSILON);
        let gap = (a.ability - b.ability) / scale;
        let p = 1.0 / (1.0 + 10.0_f64.powf(-gap));
        p.clamp(EPSILON, 1.0 - EPSILON)
    }
}
