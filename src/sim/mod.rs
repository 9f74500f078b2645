pub mod bout;
pub mod committee;
pub mod cycle;
pub mod lifecycle;
pub mod rng;

pub use bout::{BoutModel, LogisticBoutModel};
pub use committee::{PerformanceCommittee, RankCommittee};
pub use cycle::{CycleReport, PlayerLine, Simulation};
pub use lifecycle::{Lifecycle, LifecycleReport, SeededLifecycle};
pub use rng::Rng;
