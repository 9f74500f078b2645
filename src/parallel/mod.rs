pub mod batch;
pub mod pool;

pub use batch::{
    batch_ranges, career_seeds, run_career, run_careers, run_careers_sequential, CareerSummary,
};
pub use pool::WorkerPool;
