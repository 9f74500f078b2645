//! Banzuke export: one CSV row per active competitor, highest rank first.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::EngineError;
use crate::league::{Division, LeagueRegistry};
use crate::rank::RankLayout;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BanzukeRow {
    pub division: Division,
    pub rank_score: u32,
    pub rank: String,
    pub id: u32,
    pub shikona: String,
    pub stable: u16,
    pub wins: u32,
    pub losses: u32,
    pub absences: u32,
}

pub fn banzuke_rows(registry: &LeagueRegistry) -> Vec<BanzukeRow> {
    let mut rows = Vec::with_capacity(registry.len());
    for division in Division::ALL {
        let roster = registry.roster(division);
        let layout = RankLayout::for_division(division, roster.len());
        rows.extend(roster.into_iter().map(|c| BanzukeRow {
            division,
            rank_score: c.rank_score,
            rank: layout.decode(c.rank_score).to_string(),
            id: c.id.0,
            shikona: c.shikona.clone(),
            stable: c.stable_id.0,
            wins: c.wins,
            losses: c.losses,
            absences: c.absences,
        }));
    }
    rows
}

/// Writes the banzuke as CSV with a header row.
pub fn write_banzuke<W: Write>(registry: &LeagueRegistry, out: W) -> Result<(), EngineError> {
    let mut writer = csv::Writer::from_writer(out);
    for row in banzuke_rows(registry) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_banzuke_csv(
    registry: &LeagueRegistry,
    path: impl AsRef<Path>,
) -> Result<(), EngineError> {
    let file = std::fs::File::create(path)?;
    write_banzuke(registry, file)
}
