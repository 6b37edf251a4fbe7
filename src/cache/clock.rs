//! Clock block cache descriptor.

use crate::cache::Cache;

#[derive(Debug, Clone, PartialEq)]
pub struct ClockCache {
    pub capacity: usize,
    pub num_shard_bits: i32,
    pub strict_capacity_limit: bool,
}

impl ClockCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            num_shard_bits: -1,
            strict_capacity_limit: false,
        }
    }
}

impl Cache for ClockCache {
    fn type_id(&self) -> &str {
        "ClockCache"
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("capacity", self.capacity.to_string()),
            ("num_shard_bits", self.num_shard_bits.to_string()),
            ("strict_capacity_limit", self.strict_capacity_limit.to_string()),
        ]
    }
}
