//! Typed option models and the machinery that fills them.
//!
//! # Data Flow
//! ```text
//! raw value ─► decode.rs (OptionType → OptionValue)
//!           ─► resolver.rs (component specs → shared handles)
//!           ─► registry.rs (descriptor setter → schema.rs model)
//! ```

pub mod components;
pub mod decode;
pub mod enums;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod types;

pub use components::{
    Comparator, Component, ComponentRole, FilterPolicy, MemtableFactory, MergeOperator,
    ObjectSpec, SliceTransform,
};
pub use enums::{
    AccessHint, ChecksumType, CompactionPri, CompactionStyle, CompressionType, DataBlockIndexType,
    IndexType, InfoLogLevel, TableFactory, WalRecoveryMode,
};
pub use registry::{OptionDescriptor, OptionsModel, SchemaEntry};
pub use resolver::Resolver;
pub use schema::{
    BlockBasedTableOptions, ColumnFamilyDescriptor, ColumnFamilyOptions, GlobalOptions,
    VersionInfo, DEFAULT_COLUMN_FAMILY,
};
pub use types::{OptionType, OptionValue, Revision};
