use serde::Serialize;

use crate::league::{Division, LeagueRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DivisionHeadcount {
    pub division: Division,
    /// Active members, including those sitting out.
    pub headcount: usize,
    /// Active members not sitting out.
    pub available: usize,
}

/// Per-division counts taken after a reconciliation pass. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationSnapshot {
    pub divisions: Vec<DivisionHeadcount>,
    pub retired: usize,
    pub total: usize,
}

impl PopulationSnapshot {
    pub fn capture(registry: &LeagueRegistry) -> Self {
        let divisions = Division::ALL
            .iter()
            .map(|division| DivisionHeadcount {
                division: *division,
                headcount: registry.active_count(*division),
                available: registry.available(*division).len(),
            })
            .collect();
        Self {
            divisions,
            retired: registry.iter().filter(|c| !c.active).count(),
            total: registry.len(),
        }
    }

    pub fn headcount(&self, division: Division) -> usize {
        self.divisions
            .iter()
            .find(|entry| entry.division == division)
            .map_or(0, |entry| entry.headcount)
    }

    pub fn active(&self) -> usize {
        self.total - self.retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::{Competitor, CompetitorId, StableId};

    #[test]
    fn snapshot_counts_active_available_and_retired() {
        let mut registry = LeagueRegistry::new();
        for id in 0..4 {
            registry.insert(Competitor::new(
                CompetitorId(id),
                "R",
                StableId(0),
                Division::Juryo,
                id + 1,
                50.0,
            ));
        }
        registry.retire(CompetitorId(0));
        registry.get_mut(CompetitorId(1)).unwrap().kyujo = true;

        let snapshot = PopulationSnapshot::capture(&registry);
        assert_eq!(snapshot.headcount(Division::Juryo), 3);
        assert_eq!(snapshot.divisions[1].available, 2);
        assert_eq!(snapshot.retired, 1);
        assert_eq!(snapshot.active(), 3);
        assert_eq!(snapshot.headcount(Division::Makuuchi), 0);
    }
}
