//! In-memory store of every competitor the league has ever registered.
//!
//! The store is passed explicitly (`&mut LeagueRegistry`) through each phase of
//! a cycle; exactly one component mutates it at a time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::league::{Competitor, CompetitorId, Division};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueRegistry {
    competitors: BTreeMap<CompetitorId, Competitor>,
    next_id: u32,
}

impl LeagueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an id no registered competitor uses.
    pub fn allocate_id(&mut self) -> CompetitorId {
        let id = CompetitorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserts or replaces a competitor by id.
    pub fn insert(&mut self, competitor: Competitor) -> CompetitorId {
        let id = competitor.id;
        self.next_id = self.next_id.max(id.0 + 1);
        self.competitors.insert(id, competitor);
        id
    }

    pub fn get(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.get(&id)
    }

    pub fn get_mut(&mut self, id: CompetitorId) -> Option<&mut Competitor> {
        self.competitors.get_mut(&id)
    }

    /// Like [LeagueRegistry::get], but treats absence as a contract violation.
    pub fn require(
        &self,
        id: CompetitorId,
        context: &'static str,
    ) -> Result<&Competitor, EngineError> {
        self.competitors
            .get(&id)
            .ok_or(EngineError::MissingEntity { id, context })
    }

    pub fn contains(&self, id: CompetitorId) -> bool {
        self.competitors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Competitor> {
        self.competitors.values_mut()
    }

    /// Active members of `division`, best rank first (ties by id).
    pub fn roster(&self, division: Division) -> Vec<&Competitor> {
        let mut members: Vec<&Competitor> = self
            .competitors
            .values()
            .filter(|c| c.active && c.division == division)
            .collect();
        members.sort_by_key(|c| (c.rank_score, c.id));
        members
    }

    pub fn roster_ids(&self, division: Division) -> Vec<CompetitorId> {
        self.roster(division).into_iter().map(|c| c.id).collect()
    }

    /// Members that can be scheduled today: active and not sitting out.
    pub fn available(&self, division: Division) -> Vec<&Competitor> {
        self.roster(division)
            .into_iter()
            .filter(|c| !c.kyujo)
            .collect()
    }

    /// Headcount as the population policies see it.
    pub fn active_count(&self, division: Division) -> usize {
        self.competitors
            .values()
            .filter(|c| c.active && c.division == division)
            .count()
    }

    /// Marks a competitor inactive. Returns false if the id is unknown or already retired.
    pub fn retire(&mut self, id: CompetitorId) -> bool {
        match self.competitors.get_mut(&id) {
            Some(c) if c.active => {
                c.active = false;
                c.kyujo = false;
                true
            }
            _ => false,
        }
    }

    /// Clears tallies and absence flags for every active competitor.
    pub fn begin_tournament(&mut self) {
        for competitor in self.competitors.values_mut().filter(|c| c.active) {
            competitor.reset_tally();
            competitor.kyujo = false;
        }
    }
}
