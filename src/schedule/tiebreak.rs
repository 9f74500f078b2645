//! Tie-break strategies for ordering competitors that compare equal.
//!
//! The primary scheduling attempt draws its keys from the injected random
//! source. Every other attempt and every relaxation stage uses a key derived
//! from the competitor id, the day, and a salt, so repeated calls with the
//! same inputs order ties identically.

use crate::league::CompetitorId;
use crate::sim::rng::{mix64, Rng};

pub trait TieBreak {
    fn key(&mut self, id: CompetitorId) -> u64;

    /// Keys for `ids`, in order.
    fn keys(&mut self, ids: &[CompetitorId]) -> Vec<u64> {
        ids.iter().map(|id| self.key(*id)).collect()
    }
}

/// Draws keys from the simulation's random source.
pub struct RandomTieBreak<'a> {
    rng: &'a mut Rng,
}

impl<'a> RandomTieBreak<'a> {
    pub fn new(rng: &'a mut Rng) -> Self {
        Self { rng }
    }
}

impl TieBreak for RandomTieBreak<'_> {
    fn key(&mut self, _id: CompetitorId) -> u64 {
        self.rng.next_u64()
    }
}

/// Content-derived keys: a pure function of `(id, day, salt)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashTieBreak {
    seed: u64,
}

impl HashTieBreak {
    pub fn new(day: u32, salt: u64) -> Self {
        Self {
            seed: mix64(u64::from(day) ^ salt.rotate_left(32) ^ 0x5bd1_e995_2f4a_7c15),
        }
    }
}

impl TieBreak for HashTieBreak {
    fn key(&mut self, id: CompetitorId) -> u64 {
        mix64(self.seed ^ u64::from(id.0).wrapping_mul(0x9e37_79b9_7f4a_7c15))
    }
}
