use crate::dataset::EpochSeeded;
use crate::epoch::SharedEpoch;
use crate::worker::WorkerInfo;

use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A `Sampler` defines the strategy for producing the sequence of shard
/// indices a training process fetches.
///
/// Unlike a plain per-epoch sampler, implementations here own their position
/// in the training run: `iter()` takes no epoch argument because the current
/// epoch is derived from internal resume state, and each call produces a fresh
/// one-shot sequence starting from that state.
///
/// Implementations must be `Send + Sync` so the same sampler instance can be
/// safely shared across threads.
pub trait Sampler: Send + Sync {
    type Item: Send + Sync;

    /// Returns a one-shot lazy sequence of items for the current pass.
    fn iter(&self) -> Box<dyn Iterator<Item = Self::Item> + Send>;

    /// Number of items one full pass yields for this process.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// ============================================================================
/// Deterministic, resumable shard sampler for data-parallel training.
///
/// Given a dataset of `total_shards` shard containers with `chunk_size`
/// samples each, every rank of a data-parallel group constructs one of these
/// with identical parameters (apart from `rank`) and iterates it once per
/// epoch. The sampler yields the shard indices this rank should fetch, in a
/// pseudo-random order that is reproducible and consistent across ranks
/// without any inter-process communication:
///
/// - The current epoch is `consumed_shards / active_total_shards`, where
///   `consumed_shards` is derived from the consumed-sample counter by
///   truncating division. Every rank tracks the same counter (each emission
///   claims `world_size * chunk_size` samples globally), so every rank lands
///   on the same epoch.
/// - The per-epoch permutation is seeded solely by the epoch number, so all
///   ranks compute the same shuffled order and carve disjoint slices out of it.
///
/// # Arguments
/// - `total_shards`: Total number of shard containers in the dataset.
/// - `chunk_size`: Number of samples per shard. Must be >= 1.
/// - `consumed_samples`: Samples consumed so far by the whole training run,
///   summed across ranks. Read from the checkpoint on restart; must be
///   divisible by `world_size` (round down before constructing).
/// - `rank` / `world_size`: This process's position among data-parallel peers.
/// - `drop_last`: If `true`, drop the remainder when `total_shards` is not
///   divisible by `world_size`. If `false`, pad up to the next multiple and
///   remap the out-of-range indices through a second permutation so every
///   emitted index stays within `[0, total_shards)`. The remap table holds
///   `total_shards` entries, so configurations needing more padded slots than
///   that are rejected at construction.
/// - `shard_sharding`: If `true`, each rank shuffles only within its own
///   contiguous bucket of shards. If `false`, the full active shard set is
///   shuffled and each rank takes a strided subset.
///
/// # Resume
/// Every emission advances the counter by `world_size * chunk_size` *before*
/// the index is yielded, so a checkpoint taken mid-epoch records exactly the
/// samples claimed so far. A fresh sampler constructed from that counter
/// recomputes the same epoch and permutation and skips the already-consumed
/// prefix. Abandoning an iterator early is safe for the same reason.
///
/// # Loader workers
/// When a rank fans data loading out to several workers, each worker holds its
/// own sampler instance and calls [`iter_for_worker`] with its [`WorkerInfo`];
/// positions are claimed round-robin. Skipped positions still advance that
/// instance's counter, so every worker's counter tracks the global total.
///
/// [`iter_for_worker`]: ShardedEpochSampler::iter_for_worker
pub struct ShardedEpochSampler {
    total_shards: usize,
    chunk_size: usize,
    consumed_samples: Arc<AtomicUsize>,
    rank: usize,
    world_size: usize,
    drop_last: bool,
    shard_sharding: bool,
    remaining_shards: usize,
    epoch: SharedEpoch,
    dataset: Option<Arc<dyn EpochSeeded>>,
}

impl ShardedEpochSampler {
    pub fn new(
        total_shards: usize,
        chunk_size: usize,
        consumed_samples: usize,
        rank: usize,
        world_size: usize,
        drop_last: bool,
        shard_sharding: bool,
    ) -> Result<Self> {
        ensure!(world_size > 0, "world_size must be > 0");
        ensure!(
            rank < world_size,
            "Invalid rank {rank}, rank should be in the interval [0, {}]",
            world_size - 1
        );
        ensure!(chunk_size > 0, "chunk_size must be > 0");
        ensure!(
            consumed_samples % world_size == 0,
            "consumed_samples ({consumed_samples}) must be divisible by world_size ({world_size}); \
             round the checkpointed value down before constructing the sampler"
        );
        // The fallback remap table has total_shards entries, so padding can
        // reuse at most total_shards slots.
        let remaining_shards = total_shards % world_size;
        ensure!(
            drop_last || remaining_shards == 0 || world_size - remaining_shards <= total_shards,
            "Cannot pad {total_shards} shards up to a multiple of world_size ({world_size}): \
             padding would reuse {} shards but only {total_shards} exist; use drop_last instead",
            world_size - remaining_shards
        );

        Ok(Self {
            total_shards,
            chunk_size,
            consumed_samples: Arc::new(AtomicUsize::new(consumed_samples)),
            rank,
            world_size,
            drop_last,
            shard_sharding,
            remaining_shards,
            epoch: SharedEpoch::default(),
            dataset: None,
        })
    }

    /// Attaches a dataset whose per-sample randomness must follow the
    /// sampler's epoch. Enables chaining:
    /// `ShardedEpochSampler::new(..)?.with_dataset(dataset)`.
    pub fn with_dataset(mut self, dataset: Arc<dyn EpochSeeded>) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Samples claimed so far across the whole data-parallel group, as tracked
    /// by this instance. Safe to read mid-epoch for checkpoint serialization.
    pub fn consumed_samples(&self) -> usize {
        self.consumed_samples.load(Ordering::Relaxed)
    }

    /// A handle to the epoch cell this sampler publishes to. The value is
    /// refreshed at the start of every iteration pass.
    pub fn shared_epoch(&self) -> SharedEpoch {
        self.epoch.clone()
    }

    /// Shard count actually used for permutation. Always divisible by
    /// `world_size`: the remainder is either dropped or padded up.
    fn active_total_shards(&self) -> usize {
        if self.drop_last || self.remaining_shards == 0 {
            self.total_shards - self.remaining_shards
        } else {
            self.total_shards + self.world_size - self.remaining_shards
        }
    }

    #[inline]
    fn derive_rng_for_epoch(epoch: usize) -> StdRng {
        StdRng::seed_from_u64(epoch as u64)
    }

    fn permutation(n: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);
        indices
    }

    /// Produces this pass's shard indices, filtered down to the positions
    /// owned by `worker` (or unfiltered when `None`).
    ///
    /// One-shot: the returned iterator covers the remainder of the current
    /// epoch. Calling again afterwards starts the next pass from the updated
    /// counter.
    pub fn iter_for_worker(
        &self,
        worker: Option<WorkerInfo>,
    ) -> Box<dyn Iterator<Item = usize> + Send> {
        // Whole rounds of shard-fetching already completed, rounded down to a
        // multiple of world_size. Truncation here is what lets ranks with
        // slightly drifted counters agree on the resume position.
        let consumed_shards = self.consumed_samples.load(Ordering::Relaxed)
            / self.world_size
            / self.chunk_size
            * self.world_size;

        let active_total_shards = self.active_total_shards();
        if active_total_shards == 0 {
            self.epoch.set(0);
            return Box::new(std::iter::empty());
        }

        let epoch = consumed_shards / active_total_shards;
        self.epoch.set(epoch);
        let position_in_epoch = consumed_shards % active_total_shards;

        if let Some(dataset) = &self.dataset {
            dataset.set_epoch(epoch);
        }

        // One generator per pass, seeded by the epoch alone so every rank
        // derives the same draws. Exactly two draws, in fixed order: the
        // partition permutation, then the fallback remap permutation. The
        // fallback draw happens unconditionally to keep the generator
        // schedule identical across configurations.
        let mut rng = Self::derive_rng_for_epoch(epoch);

        let idx_range: Vec<usize> = if self.shard_sharding {
            let bucket_size = active_total_shards / self.world_size;
            let bucket_offset = position_in_epoch / self.world_size;
            let start_idx = self.rank * bucket_size;

            Self::permutation(bucket_size, &mut rng)
                .into_iter()
                .skip(bucket_offset)
                .map(|local| start_idx + local)
                .collect()
        } else {
            Self::permutation(active_total_shards, &mut rng)
                .into_iter()
                .skip(position_in_epoch)
                .skip(self.rank)
                .step_by(self.world_size)
                .collect()
        };

        let fallback = Self::permutation(self.total_shards, &mut rng);

        let consumed_samples = Arc::clone(&self.consumed_samples);
        let claim = self.world_size * self.chunk_size;
        let total_shards = self.total_shards;

        Box::new(
            idx_range
                .into_iter()
                .enumerate()
                .filter_map(move |(n, idx)| {
                    // Claim the samples first so a mid-epoch checkpoint never
                    // under-counts, even for positions another worker owns.
                    consumed_samples.fetch_add(claim, Ordering::Relaxed);
                    if let Some(worker) = worker {
                        if !worker.owns(n) {
                            return None;
                        }
                    }
                    if idx < total_shards {
                        Some(idx)
                    } else {
                        Some(fallback[idx - total_shards])
                    }
                }),
        )
    }
}

impl Sampler for ShardedEpochSampler {
    type Item = usize;

    fn iter(&self) -> Box<dyn Iterator<Item = usize> + Send> {
        self.iter_for_worker(None)
    }

    fn len(&self) -> usize {
        if self.drop_last {
            self.total_shards / self.world_size
        } else {
            (self.total_shards + self.world_size - 1) / self.world_size
        }
    }
}
