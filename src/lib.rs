//! Storage-engine options file loader.
//!
//! Parses an options file into typed global, column family and block-based
//! table options, resolving pluggable components (block caches, filter
//! policies, comparators and others) into shared handles.
//!
//! ```text
//! OPTIONS file ─► format (tokenize) ─► options (decode/resolve) ─► loader ─► LoadResult
//! ```

pub mod cache;
pub mod env;
pub mod format;
pub mod loader;
pub mod observability;
pub mod options;
pub mod settings;

pub use cache::SharedCache;
pub use env::SharedEnv;
pub use loader::{load, load_with, parse, LoadContext, LoadError, LoadResult};
pub use options::{ColumnFamilyDescriptor, ColumnFamilyOptions, GlobalOptions};
