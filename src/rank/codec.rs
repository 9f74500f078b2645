//! Bidirectional mapping between dense rank scores and structured ranks.
//!
//! A layout is an ordered list of bands, each consuming `capacity` ordinals.
//! Within a band, ordinal offsets alternate East/West under a shared number:
//! offset 0 is number 1 East, offset 1 is number 1 West, offset 2 is number 2 East.
//! Out-of-range input is clamped, never rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::league::Division;

/// Band name used when a layout is built with no usable bands.
pub const UNRANKED_BAND: &str = "Unranked";

/// Top named ranks of the senior division, in order, each with two slots by default.
pub const SANYAKU_BANDS: [&str; 4] = ["Yokozuna", "Ozeki", "Sekiwake", "Komusubi"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    East,
    West,
}

impl Side {
    fn offset(self) -> u32 {
        match self {
            Self::East => 0,
            Self::West => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBand {
    pub name: String,
    pub capacity: u32,
}

impl RankBand {
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rank {
    pub band: String,
    pub number: u32,
    pub side: Side,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Side::East => "East",
            Side::West => "West",
        };
        write!(f, "{} {} {}", self.band, self.number, side)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankLayout {
    bands: Vec<RankBand>,
}

impl RankLayout {
    /// Zero-capacity bands are dropped. An empty layout becomes a single one-slot band.
    pub fn new(bands: Vec<RankBand>) -> Self {
        let mut bands: Vec<RankBand> = bands.into_iter().filter(|b| b.capacity > 0).collect();
        if bands.is_empty() {
            bands.push(RankBand::new(UNRANKED_BAND, 1));
        }
        Self { bands }
    }

    pub fn single(name: impl Into<String>, capacity: u32) -> Self {
        Self::new(vec![RankBand::new(name, capacity)])
    }

    /// Standard layout for a division holding `headcount` members.
    ///
    /// The senior division reserves two slots for each sanyaku rank and gives
    /// the rest to Maegashira; other divisions are a single band.
    pub fn for_division(division: Division, headcount: usize) -> Self {
        let headcount = u32::try_from(headcount).unwrap_or(u32::MAX).max(1);
        match division {
            Division::Makuuchi => {
                let mut remaining = headcount;
                let mut bands = Vec::with_capacity(SANYAKU_BANDS.len() + 1);
                for name in SANYAKU_BANDS {
                    let capacity = remaining.min(2);
                    remaining -= capacity;
                    bands.push(RankBand::new(name, capacity));
                }
                bands.push(RankBand::new("Maegashira", remaining));
                Self::new(bands)
            }
            Division::Juryo => Self::single("Juryo", headcount),
            Division::Makushita => Self::single("Makushita", headcount),
            Division::Sandanme => Self::single("Sandanme", headcount),
            Division::Jonidan => Self::single("Jonidan", headcount),
            Division::Jonokuchi => Self::single("Jonokuchi", headcount),
            Division::Maezumo => Self::single("Maezumo", headcount),
        }
    }

    pub fn bands(&self) -> &[RankBand] {
        &self.bands
    }

    pub fn total_capacity(&self) -> u32 {
        self.bands.iter().map(|b| b.capacity).sum()
    }

    pub fn decode(&self, rank_score: u32) -> Rank {
        decode(rank_score, self)
    }

    pub fn encode(&self, rank: &Rank) -> u32 {
        encode(rank, self)
    }
}

/// Maps a rank score onto its band, number, and side. Scores are clamped to
/// `[1, total_capacity]`.
pub fn decode(rank_score: u32, layout: &RankLayout) -> Rank {
    let mut remaining = rank_score.clamp(1, layout.total_capacity());
    for band in &layout.bands {
        if remaining <= band.capacity {
            let offset = remaining - 1;
            return Rank {
                band: band.name.clone(),
                number: offset / 2 + 1,
                side: if offset % 2 == 0 { Side::East } else { Side::West },
            };
        }
        remaining -= band.capacity;
    }
    // Unreachable after clamping; fall back to the last slot.
    let last = &layout.bands[layout.bands.len() - 1];
    let offset = last.capacity - 1;
    Rank {
        band: last.name.clone(),
        number: offset / 2 + 1,
        side: if offset % 2 == 0 { Side::East } else { Side::West },
    }
}

/// Inverse of [decode]. The within-band offset is clamped to the band's
/// capacity; an unknown band name maps to the last slot of the layout.
pub fn encode(rank: &Rank, layout: &RankLayout) -> u32 {
    let mut preceding = 0u32;
    for band in &layout.bands {
        if band.name == rank.band {
            let offset = rank
                .number
                .saturating_sub(1)
                .saturating_mul(2)
                .saturating_add(rank.side.offset());
            return preceding + offset.min(band.capacity - 1) + 1;
        }
        preceding += band.capacity;
    }
    layout.total_capacity()
}
