//! Where career batches run.
//!
//! A career batch is a set of independent seeded careers, so the only knob is
//! the worker count: zero leaves the work on Rayon's global pool, anything
//! else gets a dedicated pool of that size for the duration of one call.

use rayon::ThreadPoolBuilder;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// Dedicated thread count; 0 shares the global pool.
    pub workers: usize,
}

impl WorkerPool {
    /// Careers share Rayon's global pool.
    pub fn shared() -> Self {
        Self::default()
    }

    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Runs `f` inside this pool. A dedicated pool is built per call and
    /// dropped afterwards; failing to build it is reported, not fatal.
    pub fn install<F, R>(&self, f: F) -> Result<R, EngineError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return Ok(f());
        }
        let dedicated = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("basho-career-{index}"))
            .build()?;
        Ok(dedicated.install(f))
    }
}
