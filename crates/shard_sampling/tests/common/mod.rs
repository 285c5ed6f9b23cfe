use shard_sampling::ShardedEpochSampler;

pub const CHUNK_SIZE: usize = 1;

/// Builds one sampler per rank with otherwise identical parameters, the way a
/// data-parallel group would.
pub fn build_group(
    total_shards: usize,
    chunk_size: usize,
    consumed_samples: usize,
    world_size: usize,
    drop_last: bool,
    shard_sharding: bool,
) -> Vec<ShardedEpochSampler> {
    (0..world_size)
        .map(|rank| {
            ShardedEpochSampler::new(
                total_shards,
                chunk_size,
                consumed_samples,
                rank,
                world_size,
                drop_last,
                shard_sharding,
            )
            .unwrap()
        })
        .collect()
}

/// One full pass per rank, collected.
pub fn collect_group(
    total_shards: usize,
    chunk_size: usize,
    consumed_samples: usize,
    world_size: usize,
    drop_last: bool,
    shard_sharding: bool,
) -> Vec<Vec<usize>> {
    build_group(
        total_shards,
        chunk_size,
        consumed_samples,
        world_size,
        drop_last,
        shard_sharding,
    )
    .iter()
    .map(|s| shard_sampling::Sampler::iter(s).collect())
    .collect()
}
