pub mod reconcile;
pub mod recruit;
pub mod snapshot;

pub use reconcile::{reconcile, ReconcileReport, Shortfall, Transfer};
pub use recruit::{generate_shikona, PoolRecruiter, Recruiter};
pub use snapshot::{DivisionHeadcount, PopulationSnapshot};
