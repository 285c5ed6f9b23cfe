//! Deterministic shard sampling for data-parallel training over sharded
//! (web-dataset style) corpora.
//!
//! A sharded dataset stores a fixed number of samples (`chunk_size`) per shard
//! container. During data-parallel training every rank must fetch a disjoint
//! slice of the shard set each epoch, and a restart must resume from a
//! checkpointed consumed-sample counter without replaying or skipping data.
//! [`ShardedEpochSampler`] does both with zero inter-rank communication: every
//! rank derives the current epoch from the same replicated counter and seeds
//! the same per-epoch permutation, so the partitions are consistent by
//! construction.
//!
//! ```ignore
//! let sampler = ShardedEpochSampler::new(
//!     total_shards,
//!     chunk_size,
//!     consumed_samples, // from the checkpoint, pre-rounded to world_size
//!     rank,
//!     world_size,
//!     /* drop_last */ false,
//!     /* shard_sharding */ true,
//! )?;
//!
//! for shard_idx in sampler.iter() {
//!     // fetch shard `shard_idx`
//! }
//! // periodically persist sampler.consumed_samples() for resume
//! ```

pub mod dataset;
pub mod epoch;
pub mod sampler;
pub mod worker;

pub use dataset::EpochSeeded;
pub use epoch::SharedEpoch;
pub use sampler::{Sampler, ShardedEpochSampler};
pub use worker::WorkerInfo;
