//! Settings schema definitions.
//!
//! All types derive Serde traits for deserialization from settings files.

use serde::{Deserialize, Serialize};

use crate::cache::{LruCache, SharedCache};
use crate::env::SharedEnv;
use crate::loader::LoadContext;

/// Root settings for the `options-loader` binary.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Fail on unknown keys instead of skipping them.
    pub strict_unknown_options: bool,

    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Block cache handed to every load; file-described caches are ignored.
    pub block_cache: Option<BlockCacheSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict_unknown_options: false,
            log_level: "info".to_string(),
            block_cache: None,
        }
    }
}

impl Settings {
    /// Context for loads run with these settings.
    pub fn load_context(&self, env: SharedEnv) -> LoadContext {
        let ctx = LoadContext::new(env).strict(self.strict_unknown_options);
        match &self.block_cache {
            Some(cache) => ctx.with_cache(cache.build()),
            None => ctx,
        }
    }
}

/// LRU block cache supplied by the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockCacheSettings {
    /// Capacity in bytes.
    pub capacity: usize,

    /// `-1` lets the cache pick.
    pub num_shard_bits: i32,

    pub strict_capacity_limit: bool,
}

impl Default for BlockCacheSettings {
    fn default() -> Self {
        Self {
            capacity: 8 * 1024 * 1024,
            num_shard_bits: -1,
            strict_capacity_limit: false,
        }
    }
}

impl BlockCacheSettings {
    pub fn build(&self) -> SharedCache {
        SharedCache::new(
            LruCache::new(self.capacity)
                .with_num_shard_bits(self.num_shard_bits)
                .with_strict_capacity_limit(self.strict_capacity_limit),
        )
    }
}
