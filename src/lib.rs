pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod league;
pub mod parallel;
pub mod population;
pub mod rank;
pub mod schedule;
pub mod sim;

pub use config::LeagueConfig;
pub use error::EngineError;
