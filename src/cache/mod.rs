//! Block cache handles.
//!
//! # Responsibilities
//! - Define the `Cache` capability referenced by table options
//! - Provide `SharedCache`, the handle shared between column families
//! - Describe the built-in cache kinds the resolver can construct
//!
//! # Design Decisions
//! - The loader does not implement caching; a cache here is a sized
//!   descriptor the engine turns into memory at open time
//! - Identity matters: one resolved cache is referenced, not copied, by every
//!   family that names it (`SharedCache::same_instance`)
//! - Equality compares the description so reloaded options compare equal

pub mod clock;
pub mod lru;

use std::fmt;
use std::sync::Arc;

pub use clock::ClockCache;
pub use lru::LruCache;

/// A block cache the engine can attach to table readers.
pub trait Cache: Send + Sync + fmt::Debug {
    /// Factory name used in options files (e.g. `"LRUCache"`).
    fn type_id(&self) -> &str;

    /// Capacity in bytes.
    fn capacity(&self) -> usize;

    /// Construction parameters in declaration order, rendered as text.
    fn params(&self) -> Vec<(&'static str, String)>;
}

/// Reference-counted handle to a [`Cache`].
#[derive(Clone)]
pub struct SharedCache(Arc<dyn Cache>);

impl SharedCache {
    pub fn new(cache: impl Cache + 'static) -> Self {
        Self(Arc::new(cache))
    }

    pub fn from_arc(cache: Arc<dyn Cache>) -> Self {
        Self(cache)
    }

    pub fn type_id(&self) -> &str {
        self.0.type_id()
    }

    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        self.0.params()
    }

    /// True when both handles point at the same cache instance.
    pub fn same_instance(&self, other: &SharedCache) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles to this instance.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl PartialEq for SharedCache {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
            || (self.type_id() == other.type_id() && self.params() == other.params())
    }
}

impl fmt::Debug for SharedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCache")
            .field("type_id", &self.type_id())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl serde::Serialize for SharedCache {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let params = self.params();
        let mut map = serializer.serialize_map(Some(params.len() + 1))?;
        map.serialize_entry("type", self.type_id())?;
        for (key, value) in &params {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
