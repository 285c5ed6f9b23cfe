//! Shared epoch cell.
//!
//! The sampler recomputes the current epoch from its consumed-sample counter on
//! every iteration pass and publishes it here, so collaborators running on
//! loader workers (e.g. a dataset seeding per-sample transforms) can read it
//! without holding a reference to the sampler itself.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A single epoch number shared between the main thread and loader workers of
/// the current process. Not shared across distributed ranks; each rank derives
/// the same value independently.
///
/// `Clone` hands out another handle to the same cell. Writes are
/// last-write-wins; a concurrent reader sees either the old or the new value,
/// never a torn one.
#[derive(Debug, Clone, Default)]
pub struct SharedEpoch {
    value: Arc<AtomicUsize>,
}

impl SharedEpoch {
    pub fn new(epoch: usize) -> Self {
        Self {
            value: Arc::new(AtomicUsize::new(epoch)),
        }
    }

    pub fn set(&self, epoch: usize) {
        self.value.store(epoch, Ordering::Relaxed);
    }

    pub fn get(&self) -> usize {
        self.value.load(Ordering::Relaxed)
    }
}
