pub mod builder;
pub mod competitor;
pub mod division;
pub mod export;
pub mod registry;

pub use builder::{LeagueBuilder, SeededLeague};
pub use competitor::{rank_number, Competitor, CompetitorId, StableId};
pub use division::{BoundaryId, Division, HeadcountPolicy};
pub use export::{banzuke_rows, write_banzuke, write_banzuke_csv, BanzukeRow};
pub use registry::LeagueRegistry;
