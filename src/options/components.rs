//! Pluggable components referenced from options files.
//!
//! # Responsibilities
//! - Parse `TypeName:key=value;...` references into [`ObjectSpec`]
//! - Enumerate every component kind the loader can produce ([`Component`])
//! - Describe components back into their textual form
//!
//! # Design Decisions
//! - Component kinds are a closed enum; construction by name goes through the
//!   static factory table in `resolver.rs`
//! - Components are reference counted so one resolution is shared by every
//!   field naming it

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::cache::SharedCache;
use crate::format::escape::{
    contains_unescaped, escape, split_once_unescaped, split_unescaped, trim_unescaped,
};

/// The slot a component fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentRole {
    BlockCache,
    FilterPolicy,
    Comparator,
    PrefixExtractor,
    MergeOperator,
    MemtableFactory,
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentRole::BlockCache => "block cache",
            ComponentRole::FilterPolicy => "filter policy",
            ComponentRole::Comparator => "comparator",
            ComponentRole::PrefixExtractor => "prefix extractor",
            ComponentRole::MergeOperator => "merge operator",
            ComponentRole::MemtableFactory => "memtable factory",
        };
        f.write_str(name)
    }
}

/// One parameter of a component reference. Positional when `key` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub key: Option<String>,
    /// Still escaped.
    pub value: String,
}

/// Unresolved component reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectSpec {
    pub type_id: String,
    pub params: Vec<Param>,
}

impl ObjectSpec {
    /// Parse `TypeName`, `TypeName:k=v;k=v`, or the positional forms
    /// `TypeName:v1;v2` and `TypeName:v1:v2`.
    pub fn parse(raw: &str) -> Self {
        let raw = trim_unescaped(raw);
        let Some((type_id, rest)) = split_once_unescaped(raw, ':') else {
            return Self {
                type_id: raw.to_string(),
                params: Vec::new(),
            };
        };

        let positional_colons = !contains_unescaped(rest, '=') && !contains_unescaped(rest, ';');
        let pieces = if positional_colons {
            split_unescaped(rest, ':')
        } else {
            split_unescaped(rest, ';')
        };

        let params = pieces
            .into_iter()
            .map(trim_unescaped)
            .filter(|p| !p.is_empty())
            .map(|piece| match split_once_unescaped(piece, '=') {
                Some((key, value)) => Param {
                    key: Some(key.trim().to_string()),
                    value: trim_unescaped(value).to_string(),
                },
                None => Param {
                    key: None,
                    value: piece.to_string(),
                },
            })
            .collect();

        Self {
            type_id: type_id.trim().to_string(),
            params,
        }
    }
}

impl fmt::Display for ObjectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_id)?;
        for (idx, param) in self.params.iter().enumerate() {
            f.write_str(if idx == 0 { ":" } else { ";" })?;
            match &param.key {
                Some(key) => write!(f, "{key}={}", param.value)?,
                None => f.write_str(&param.value)?,
            }
        }
        Ok(())
    }
}

/// Table filter policy.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPolicy {
    Bloom {
        bits_per_key: f64,
        use_block_based_builder: bool,
    },
    Ribbon {
        bloom_equivalent_bits_per_key: f64,
        bloom_before_level: i32,
    },
}

/// Key ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Bytewise,
    ReverseBytewise,
}

/// Prefix extractor used by prefix bloom filters and prefix seeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceTransform {
    FixedPrefix(usize),
    CappedPrefix(usize),
    Noop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOperator {
    Put,
    UInt64Add,
    StringAppend { delimiter: String },
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemtableFactory {
    SkipList { lookahead: usize },
    Vector { count: usize },
}

impl Default for MemtableFactory {
    fn default() -> Self {
        MemtableFactory::SkipList { lookahead: 0 }
    }
}

/// Textual identity of a component: factory name plus parameters.
pub trait Describe {
    fn type_id(&self) -> &'static str;
    fn params(&self) -> Vec<(&'static str, String)>;
}

impl Describe for FilterPolicy {
    fn type_id(&self) -> &'static str {
        match self {
            FilterPolicy::Bloom { .. } => "BloomFilter",
            FilterPolicy::Ribbon { .. } => "RibbonFilter",
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            FilterPolicy::Bloom {
                bits_per_key,
                use_block_based_builder,
            } => vec![
                ("bits_per_key", bits_per_key.to_string()),
                ("use_block_based_builder", use_block_based_builder.to_string()),
            ],
            FilterPolicy::Ribbon {
                bloom_equivalent_bits_per_key,
                bloom_before_level,
            } => vec![
                (
                    "bloom_equivalent_bits_per_key",
                    bloom_equivalent_bits_per_key.to_string(),
                ),
                ("bloom_before_level", bloom_before_level.to_string()),
            ],
        }
    }
}

impl Describe for Comparator {
    fn type_id(&self) -> &'static str {
        match self {
            Comparator::Bytewise => "leveldb.BytewiseComparator",
            Comparator::ReverseBytewise => "rocksdb.ReverseBytewiseComparator",
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

impl Describe for SliceTransform {
    fn type_id(&self) -> &'static str {
        match self {
            SliceTransform::FixedPrefix(_) => "rocksdb.FixedPrefix",
            SliceTransform::CappedPrefix(_) => "rocksdb.CappedPrefix",
            SliceTransform::Noop => "rocksdb.Noop",
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            SliceTransform::FixedPrefix(len) | SliceTransform::CappedPrefix(len) => {
                vec![("length", len.to_string())]
            }
            SliceTransform::Noop => Vec::new(),
        }
    }
}

impl Describe for MergeOperator {
    fn type_id(&self) -> &'static str {
        match self {
            MergeOperator::Put => "PutOperator",
            MergeOperator::UInt64Add => "UInt64AddOperator",
            MergeOperator::StringAppend { .. } => "StringAppendOperator",
            MergeOperator::Max => "MaxOperator",
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            MergeOperator::StringAppend { delimiter } => vec![("delimiter", delimiter.clone())],
            _ => Vec::new(),
        }
    }
}

impl Describe for MemtableFactory {
    fn type_id(&self) -> &'static str {
        match self {
            MemtableFactory::SkipList { .. } => "SkipListFactory",
            MemtableFactory::Vector { .. } => "VectorRepFactory",
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            MemtableFactory::SkipList { lookahead } => vec![("lookahead", lookahead.to_string())],
            MemtableFactory::Vector { count } => vec![("count", count.to_string())],
        }
    }
}

/// A resolved component handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Cache(SharedCache),
    FilterPolicy(Arc<FilterPolicy>),
    Comparator(Arc<Comparator>),
    PrefixExtractor(Arc<SliceTransform>),
    MergeOperator(Arc<MergeOperator>),
    MemtableFactory(Arc<MemtableFactory>),
}

impl Component {
    pub fn role(&self) -> ComponentRole {
        match self {
            Component::Cache(_) => ComponentRole::BlockCache,
            Component::FilterPolicy(_) => ComponentRole::FilterPolicy,
            Component::Comparator(_) => ComponentRole::Comparator,
            Component::PrefixExtractor(_) => ComponentRole::PrefixExtractor,
            Component::MergeOperator(_) => ComponentRole::MergeOperator,
            Component::MemtableFactory(_) => ComponentRole::MemtableFactory,
        }
    }

    pub fn type_id(&self) -> &str {
        match self {
            Component::Cache(c) => c.type_id(),
            Component::FilterPolicy(c) => c.type_id(),
            Component::Comparator(c) => c.type_id(),
            Component::PrefixExtractor(c) => c.type_id(),
            Component::MergeOperator(c) => c.type_id(),
            Component::MemtableFactory(c) => c.type_id(),
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Component::Cache(c) => c.params(),
            Component::FilterPolicy(c) => c.params(),
            Component::Comparator(c) => c.params(),
            Component::PrefixExtractor(c) => c.params(),
            Component::MergeOperator(c) => c.params(),
            Component::MemtableFactory(c) => c.params(),
        }
    }

    /// Canonical `Type:k=v;k=v` text with escaped values. Reparses to an
    /// equal component.
    pub fn describe(&self) -> String {
        let mut out = self.type_id().to_string();
        for (idx, (key, value)) in self.params().iter().enumerate() {
            out.push(if idx == 0 { ':' } else { ';' });
            out.push_str(key);
            out.push('=');
            out.push_str(&escape(value));
        }
        out
    }

    /// True when both refer to the same allocation.
    pub fn same_instance(&self, other: &Component) -> bool {
        match (self, other) {
            (Component::Cache(a), Component::Cache(b)) => a.same_instance(b),
            (Component::FilterPolicy(a), Component::FilterPolicy(b)) => Arc::ptr_eq(a, b),
            (Component::Comparator(a), Component::Comparator(b)) => Arc::ptr_eq(a, b),
            (Component::PrefixExtractor(a), Component::PrefixExtractor(b)) => Arc::ptr_eq(a, b),
            (Component::MergeOperator(a), Component::MergeOperator(b)) => Arc::ptr_eq(a, b),
            (Component::MemtableFactory(a), Component::MemtableFactory(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Serializes as `{"type": ..., param: value, ...}`.
fn serialize_described<S: Serializer>(
    type_id: &str,
    params: &[(&'static str, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(params.len() + 1))?;
    map.serialize_entry("type", type_id)?;
    for (key, value) in params {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

macro_rules! serialize_via_describe {
    ($($t:ty),+) => {$(
        impl Serialize for $t {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_described(self.type_id(), &self.params(), serializer)
            }
        }
    )+};
}

serialize_via_describe!(FilterPolicy, Comparator, SliceTransform, MergeOperator, MemtableFactory);
