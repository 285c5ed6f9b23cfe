//! Loader-worker identity.
//!
//! When a rank fans its sampler output out to several loader workers, each
//! worker holds its own copy of the sampler and filters the shared emission
//! order down to the positions it owns (round-robin by position). The identity
//! is passed explicitly to the iteration call rather than read from ambient
//! thread-local state, so the filtering stays testable without spawning
//! workers.

use anyhow::{ensure, Result};

/// Identity of one loader worker among `num_workers` cooperating workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerInfo {
    pub id: usize,
    pub num_workers: usize,
}

impl WorkerInfo {
    pub fn new(id: usize, num_workers: usize) -> Result<Self> {
        ensure!(num_workers > 0, "num_workers must be > 0");
        ensure!(
            id < num_workers,
            "Invalid worker id {id}, must be in the interval [0, {}]",
            num_workers - 1
        );
        Ok(Self { id, num_workers })
    }

    /// Whether position `n` of the emission order belongs to this worker.
    #[inline]
    pub fn owns(&self, n: usize) -> bool {
        n % self.num_workers == self.id
    }
}
