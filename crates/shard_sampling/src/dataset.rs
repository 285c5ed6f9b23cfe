//! Epoch-seeding capability for dataset collaborators.

/// Implemented by datasets whose per-sample transform randomness must follow
/// the sampler's epoch (e.g. a web-dataset pipeline that reshuffles samples
/// within each shard with an epoch-derived seed).
///
/// The sampler forwards the epoch once per iteration pass; datasets without
/// epoch-dependent randomness simply do not implement this. `set_epoch` takes
/// `&self` because the sampler only holds a shared handle; implementations
/// typically store the value in an atomic or a [`SharedEpoch`].
///
/// [`SharedEpoch`]: crate::epoch::SharedEpoch
pub trait EpochSeeded: Send + Sync {
    fn set_epoch(&self, epoch: usize);
}
