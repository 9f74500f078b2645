use crate::league::CompetitorId;

/// Failures the engine reports instead of degrading.
///
/// Scheduling, exchange, and reconciliation irregularities never surface here;
/// they fall back to relaxed or truncated behaviour. What remains are contract
/// violations and the I/O edges of the drivers.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("competitor {id} is required for {context} but is not in the registry")]
    MissingEntity {
        id: CompetitorId,
        context: &'static str,
    },
    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}': {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to export roster: {0}")]
    Export(#[from] csv::Error),
    #[error("failed to write roster export: {0}")]
    Io(#[from] std::io::Error),
}
