use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::league::CompetitorId;

/// Opponents each competitor has already met this tournament.
///
/// Symmetric and grow-only; build a fresh one per tournament.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacedSet {
    opponents: BTreeMap<CompetitorId, BTreeSet<CompetitorId>>,
}

impl FacedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_faced(&self, a: CompetitorId, b: CompetitorId) -> bool {
        self.opponents
            .get(&a)
            .is_some_and(|faced| faced.contains(&b))
    }

    pub fn mark(&mut self, a: CompetitorId, b: CompetitorId) {
        self.opponents.entry(a).or_default().insert(b);
        self.opponents.entry(b).or_default().insert(a);
    }

    pub fn opponents(&self, id: CompetitorId) -> impl Iterator<Item = CompetitorId> + '_ {
        self.opponents
            .get(&id)
            .into_iter()
            .flat_map(|faced| faced.iter().copied())
    }

    pub fn bouts_recorded(&self, id: CompetitorId) -> usize {
        self.opponents.get(&id).map_or(0, BTreeSet::len)
    }
}
