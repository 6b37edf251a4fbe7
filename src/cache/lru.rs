//! LRU block cache descriptor.

use crate::cache::Cache;

/// Sharded LRU cache with an optional high-priority pool.
#[derive(Debug, Clone, PartialEq)]
pub struct LruCache {
    pub capacity: usize,
    /// `-1` lets the engine pick a shard count from the capacity.
    pub num_shard_bits: i32,
    pub strict_capacity_limit: bool,
    pub high_pri_pool_ratio: f64,
}

impl LruCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            num_shard_bits: -1,
            strict_capacity_limit: false,
            high_pri_pool_ratio: 0.5,
        }
    }

    pub fn with_num_shard_bits(mut self, bits: i32) -> Self {
        self.num_shard_bits = bits;
        self
    }

    pub fn with_strict_capacity_limit(mut self, strict: bool) -> Self {
        self.strict_capacity_limit = strict;
        self
    }

    pub fn with_high_pri_pool_ratio(mut self, ratio: f64) -> Self {
        self.high_pri_pool_ratio = ratio;
        self
    }
}

impl Cache for LruCache {
    fn type_id(&self) -> &str {
        "LRUCache"
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("capacity", self.capacity.to_string()),
            ("num_shard_bits", self.num_shard_bits.to_string()),
            ("strict_capacity_limit", self.strict_capacity_limit.to_string()),
            ("high_pri_pool_ratio", self.high_pri_pool_ratio.to_string()),
        ]
    }
}
