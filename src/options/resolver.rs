//! Component resolution.
//!
//! # Responsibilities
//! - Map a parsed component reference to a live, shared handle
//! - Bind keyed and positional parameters to each factory's declared list
//! - Give the caller's block cache precedence over cache specs in the file
//!
//! # Design Decisions
//! - The factory table is a closed, static list; unknown names fail
//! - Resolution is memoised per load: two fields describing the same
//!   component share one `Arc`
//!
//! # Data Flow
//! ```text
//! ObjectSpec ─► caller cache? ─► factory lookup ─► bind params ─► build
//!                                                              └─► memo
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{ClockCache, LruCache, SharedCache};
use crate::loader::policy::{DiagnosticLog, Site};
use crate::loader::LoadError;
use crate::options::components::{
    Comparator, Component, ComponentRole, FilterPolicy, MemtableFactory, MergeOperator,
    ObjectSpec, SliceTransform,
};
use crate::options::decode::decode;
use crate::options::types::{OptionField, OptionType, OptionValue, Revision};

/// Default capacity of a cache described without one.
pub const DEFAULT_CACHE_CAPACITY: usize = 8 << 20;

/// A declared factory parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: OptionType,
}

const fn param(name: &'static str, ty: OptionType) -> ParamSpec {
    ParamSpec { name, ty }
}

/// Parameters bound and decoded for one factory call.
#[derive(Debug)]
pub struct BoundParams {
    type_id: &'static str,
    values: Vec<(&'static str, OptionValue)>,
}

impl BoundParams {
    fn get<T: OptionField>(&self, name: &str) -> Option<T> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| T::from_value(v.clone()))
    }

    fn or<T: OptionField>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    fn required<T: OptionField>(&self, name: &str, ty: OptionType) -> Result<T, LoadError> {
        self.get(name).ok_or_else(|| LoadError::Type {
            option: format!("{}.{name}", self.type_id),
            raw_value: String::new(),
            expected: format!("{} (required)", ty.describe()),
        })
    }
}

/// A named constructor in the closed factory table.
pub struct ComponentFactory {
    pub role: ComponentRole,
    pub type_id: &'static str,
    pub aliases: &'static [&'static str],
    pub params: &'static [ParamSpec],
    build: fn(&BoundParams) -> Result<Component, LoadError>,
}

impl ComponentFactory {
    fn matches(&self, role: ComponentRole, type_id: &str) -> bool {
        self.role == role && (self.type_id == type_id || self.aliases.contains(&type_id))
    }
}

impl std::fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("role", &self.role)
            .field("type_id", &self.type_id)
            .finish()
    }
}

const CACHE_PARAMS: &[ParamSpec] = &[
    param("capacity", OptionType::SizeT),
    param("num_shard_bits", OptionType::Int32),
    param("strict_capacity_limit", OptionType::Bool),
    param("high_pri_pool_ratio", OptionType::Double),
];

const PREFIX_PARAMS: &[ParamSpec] = &[param("length", OptionType::SizeT)];

fn build_lru(p: &BoundParams) -> Result<Component, LoadError> {
    let cache = LruCache::new(p.or("capacity", DEFAULT_CACHE_CAPACITY))
        .with_num_shard_bits(p.or("num_shard_bits", -1))
        .with_strict_capacity_limit(p.or("strict_capacity_limit", false))
        .with_high_pri_pool_ratio(p.or("high_pri_pool_ratio", 0.5));
    Ok(Component::Cache(SharedCache::new(cache)))
}

fn build_clock(p: &BoundParams) -> Result<Component, LoadError> {
    let cache = ClockCache {
        num_shard_bits: p.or("num_shard_bits", -1),
        strict_capacity_limit: p.or("strict_capacity_limit", false),
        ..ClockCache::new(p.or("capacity", DEFAULT_CACHE_CAPACITY))
    };
    Ok(Component::Cache(SharedCache::new(cache)))
}

fn build_bloom(p: &BoundParams) -> Result<Component, LoadError> {
    Ok(Component::FilterPolicy(Arc::new(FilterPolicy::Bloom {
        bits_per_key: p.or("bits_per_key", 10.0),
        use_block_based_builder: p.or("use_block_based_builder", false),
    })))
}

fn build_ribbon(p: &BoundParams) -> Result<Component, LoadError> {
    Ok(Component::FilterPolicy(Arc::new(FilterPolicy::Ribbon {
        bloom_equivalent_bits_per_key: p.or("bloom_equivalent_bits_per_key", 10.0),
        bloom_before_level: p.or("bloom_before_level", -1),
    })))
}

fn build_fixed_prefix(p: &BoundParams) -> Result<Component, LoadError> {
    let length = p.required("length", OptionType::SizeT)?;
    Ok(Component::PrefixExtractor(Arc::new(SliceTransform::FixedPrefix(length))))
}

fn build_capped_prefix(p: &BoundParams) -> Result<Component, LoadError> {
    let length = p.required("length", OptionType::SizeT)?;
    Ok(Component::PrefixExtractor(Arc::new(SliceTransform::CappedPrefix(length))))
}

fn build_string_append(p: &BoundParams) -> Result<Component, LoadError> {
    Ok(Component::MergeOperator(Arc::new(MergeOperator::StringAppend {
        delimiter: p.or("delimiter", ",".to_string()),
    })))
}

fn build_skip_list(p: &BoundParams) -> Result<Component, LoadError> {
    Ok(Component::MemtableFactory(Arc::new(MemtableFactory::SkipList {
        lookahead: p.or("lookahead", 0),
    })))
}

fn build_vector(p: &BoundParams) -> Result<Component, LoadError> {
    Ok(Component::MemtableFactory(Arc::new(MemtableFactory::Vector {
        count: p.or("count", 0),
    })))
}

/// Every component the loader can construct by name.
pub static FACTORIES: &[ComponentFactory] = &[
    ComponentFactory {
        role: ComponentRole::BlockCache,
        type_id: "LRUCache",
        aliases: &["rocksdb.LRUCache"],
        params: CACHE_PARAMS,
        build: build_lru,
    },
    ComponentFactory {
        role: ComponentRole::BlockCache,
        type_id: "ClockCache",
        aliases: &["rocksdb.ClockCache"],
        params: &[
            param("capacity", OptionType::SizeT),
            param("num_shard_bits", OptionType::Int32),
            param("strict_capacity_limit", OptionType::Bool),
        ],
        build: build_clock,
    },
    ComponentFactory {
        role: ComponentRole::FilterPolicy,
        type_id: "BloomFilter",
        aliases: &["rocksdb.BuiltinBloomFilter", "rocksdb.BloomFilter", "bloomfilter"],
        params: &[
            param("bits_per_key", OptionType::Double),
            param("use_block_based_builder", OptionType::Bool),
        ],
        build: build_bloom,
    },
    ComponentFactory {
        role: ComponentRole::FilterPolicy,
        type_id: "RibbonFilter",
        aliases: &["rocksdb.RibbonFilter", "ribbonfilter"],
        params: &[
            param("bloom_equivalent_bits_per_key", OptionType::Double),
            param("bloom_before_level", OptionType::Int32),
        ],
        build: build_ribbon,
    },
    ComponentFactory {
        role: ComponentRole::Comparator,
        type_id: "leveldb.BytewiseComparator",
        aliases: &["BytewiseComparator"],
        params: &[],
        build: |_| Ok(Component::Comparator(Arc::new(Comparator::Bytewise))),
    },
    ComponentFactory {
        role: ComponentRole::Comparator,
        type_id: "rocksdb.ReverseBytewiseComparator",
        aliases: &["ReverseBytewiseComparator"],
        params: &[],
        build: |_| Ok(Component::Comparator(Arc::new(Comparator::ReverseBytewise))),
    },
    ComponentFactory {
        role: ComponentRole::PrefixExtractor,
        type_id: "rocksdb.FixedPrefix",
        aliases: &["FixedPrefix"],
        params: PREFIX_PARAMS,
        build: build_fixed_prefix,
    },
    ComponentFactory {
        role: ComponentRole::PrefixExtractor,
        type_id: "rocksdb.CappedPrefix",
        aliases: &["CappedPrefix"],
        params: PREFIX_PARAMS,
        build: build_capped_prefix,
    },
    ComponentFactory {
        role: ComponentRole::PrefixExtractor,
        type_id: "rocksdb.Noop",
        aliases: &["Noop"],
        params: &[],
        build: |_| Ok(Component::PrefixExtractor(Arc::new(SliceTransform::Noop))),
    },
    ComponentFactory {
        role: ComponentRole::MergeOperator,
        type_id: "PutOperator",
        aliases: &["put"],
        params: &[],
        build: |_| Ok(Component::MergeOperator(Arc::new(MergeOperator::Put))),
    },
    ComponentFactory {
        role: ComponentRole::MergeOperator,
        type_id: "UInt64AddOperator",
        aliases: &["uint64add"],
        params: &[],
        build: |_| Ok(Component::MergeOperator(Arc::new(MergeOperator::UInt64Add))),
    },
    ComponentFactory {
        role: ComponentRole::MergeOperator,
        type_id: "StringAppendOperator",
        aliases: &["stringappend"],
        params: &[param("delimiter", OptionType::String)],
        build: build_string_append,
    },
    ComponentFactory {
        role: ComponentRole::MergeOperator,
        type_id: "MaxOperator",
        aliases: &["max"],
        params: &[],
        build: |_| Ok(Component::MergeOperator(Arc::new(MergeOperator::Max))),
    },
    ComponentFactory {
        role: ComponentRole::MemtableFactory,
        type_id: "SkipListFactory",
        aliases: &["skip_list"],
        params: &[param("lookahead", OptionType::SizeT)],
        build: build_skip_list,
    },
    ComponentFactory {
        role: ComponentRole::MemtableFactory,
        type_id: "VectorRepFactory",
        aliases: &["vector"],
        params: &[param("count", OptionType::SizeT)],
        build: build_vector,
    },
];

/// Find the factory for `type_id`. A legacy dotted name such as
/// `rocksdb.FixedPrefix.8` also matches, returning the numeric suffix.
fn find_factory(
    role: ComponentRole,
    type_id: &str,
) -> Option<(&'static ComponentFactory, Option<String>)> {
    if let Some(factory) = FACTORIES.iter().find(|f| f.matches(role, type_id)) {
        return Some((factory, None));
    }
    let (base, suffix) = type_id.rsplit_once('.')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    FACTORIES
        .iter()
        .find(|f| f.matches(role, base))
        .map(|f| (f, Some(suffix.to_string())))
}

/// Resolves component references for one load.
#[derive(Debug, Default)]
pub struct Resolver {
    cache: Option<SharedCache>,
    memo: HashMap<(ComponentRole, String), Component>,
}

impl Resolver {
    /// `cache`, when given, fills every block cache slot the file describes.
    pub fn new(cache: Option<SharedCache>) -> Self {
        Self {
            cache,
            memo: HashMap::new(),
        }
    }

    /// Number of distinct components built so far.
    pub fn resolved_count(&self) -> usize {
        self.memo.len()
    }

    pub fn resolve(
        &mut self,
        spec: &ObjectSpec,
        role: ComponentRole,
        site: &Site<'_>,
        revision: Revision,
        log: &mut DiagnosticLog,
    ) -> Result<Component, LoadError> {
        if role == ComponentRole::BlockCache {
            if let Some(cache) = &self.cache {
                tracing::debug!(
                    described = %spec,
                    supplied = cache.type_id(),
                    line = site.line,
                    "Using caller-supplied block cache"
                );
                return Ok(Component::Cache(cache.clone()));
            }
        }

        let (factory, suffix) =
            find_factory(role, &spec.type_id).ok_or_else(|| LoadError::Resolution {
                type_id: spec.type_id.clone(),
            })?;

        let params = bind(factory, spec, suffix, site, revision, log)?;
        let built = (factory.build)(&params)?;

        let key = (role, built.describe());
        if let Some(existing) = self.memo.get(&key) {
            return Ok(existing.clone());
        }
        tracing::debug!(component = %key.1, line = site.line, "Resolved component");
        self.memo.insert(key, built.clone());
        Ok(built)
    }
}

fn bind(
    factory: &'static ComponentFactory,
    spec: &ObjectSpec,
    suffix: Option<String>,
    site: &Site<'_>,
    revision: Revision,
    log: &mut DiagnosticLog,
) -> Result<BoundParams, LoadError> {
    let mut bound = BoundParams {
        type_id: factory.type_id,
        values: Vec::new(),
    };

    let positional = suffix
        .into_iter()
        .chain(
            spec.params
                .iter()
                .filter(|p| p.key.is_none())
                .map(|p| p.value.clone()),
        )
        .enumerate();
    for (idx, raw) in positional {
        match factory.params.get(idx) {
            Some(decl) => store(&mut bound, decl, &raw, revision)?,
            None => log.unknown(site, &format!("{}[{idx}]", factory.type_id))?,
        }
    }

    for p in &spec.params {
        let Some(key) = &p.key else { continue };
        match factory.params.iter().find(|decl| decl.name == key) {
            Some(decl) => store(&mut bound, decl, &p.value, revision)?,
            None => log.unknown(site, &format!("{}.{key}", factory.type_id))?,
        }
    }

    Ok(bound)
}

/// Decode one parameter. A later binding of the same name wins.
fn store(
    bound: &mut BoundParams,
    decl: &ParamSpec,
    raw: &str,
    revision: Revision,
) -> Result<(), LoadError> {
    let option = format!("{}.{}", bound.type_id, decl.name);
    let value = decode(&option, &decl.ty, raw, revision)?;
    bound.values.retain(|(name, _)| *name != decl.name);
    bound.values.push((decl.name, value));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SectionKind;
    use crate::loader::policy::{DiagnosticKind, UnknownOptionPolicy};

    fn site() -> Site<'static> {
        Site {
            section: SectionKind::NestedComponentOptions,
            name: Some("default"),
            line: 12,
        }
    }

    fn resolve(
        resolver: &mut Resolver,
        raw: &str,
        role: ComponentRole,
    ) -> Result<Component, LoadError> {
        let mut log = DiagnosticLog::new(UnknownOptionPolicy::Reject);
        resolver.resolve(&ObjectSpec::parse(raw), role, &site(), Revision::LATEST, &mut log)
    }

    #[test]
    fn test_resolve_lru_cache() {
        let mut resolver = Resolver::default();
        let Component::Cache(cache) = resolve(
            &mut resolver,
            "LRUCache:capacity=1000;num_shard_bits=4",
            ComponentRole::BlockCache,
        )
        .unwrap() else {
            panic!("expected a cache");
        };
        assert_eq!(cache.type_id(), "LRUCache");
        assert_eq!(cache.capacity(), 1000);
        assert!(cache.params().contains(&("num_shard_bits", "4".to_string())));
    }

    #[test]
    fn test_caller_cache_wins() {
        let supplied = SharedCache::new(LruCache::new(1000));
        let mut resolver = Resolver::new(Some(supplied.clone()));
        let Component::Cache(cache) =
            resolve(&mut resolver, "LRUCache:capacity=5", ComponentRole::BlockCache).unwrap()
        else {
            panic!("expected a cache");
        };
        assert!(cache.same_instance(&supplied));
        assert_eq!(cache.capacity(), 1000);
    }

    #[test]
    fn test_identical_specs_share_instance() {
        let mut resolver = Resolver::default();
        let a = resolve(&mut resolver, "BloomFilter:bits_per_key=10", ComponentRole::FilterPolicy)
            .unwrap();
        let b = resolve(&mut resolver, "bloomfilter:10:false", ComponentRole::FilterPolicy)
            .unwrap();
        let c = resolve(&mut resolver, "BloomFilter:bits_per_key=12", ComponentRole::FilterPolicy)
            .unwrap();
        assert!(a.same_instance(&b));
        assert!(!a.same_instance(&c));
        assert_eq!(resolver.resolved_count(), 2);
    }

    #[test]
    fn test_legacy_dotted_prefix() {
        let mut resolver = Resolver::default();
        let component =
            resolve(&mut resolver, "rocksdb.FixedPrefix.8", ComponentRole::PrefixExtractor)
                .unwrap();
        assert_eq!(
            component,
            Component::PrefixExtractor(Arc::new(SliceTransform::FixedPrefix(8)))
        );
    }

    #[test]
    fn test_missing_required_param() {
        let mut resolver = Resolver::default();
        let err = resolve(&mut resolver, "rocksdb.CappedPrefix", ComponentRole::PrefixExtractor)
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Type { ref option, .. } if option == "rocksdb.CappedPrefix.length"
        ));
    }

    #[test]
    fn test_unknown_type_and_wrong_role() {
        let mut resolver = Resolver::default();
        let err = resolve(&mut resolver, "FancyCache:capacity=1", ComponentRole::BlockCache)
            .unwrap_err();
        assert!(matches!(err, LoadError::Resolution { ref type_id } if type_id == "FancyCache"));

        let err = resolve(&mut resolver, "LRUCache", ComponentRole::Comparator).unwrap_err();
        assert!(matches!(err, LoadError::Resolution { .. }));
    }

    #[test]
    fn test_param_type_error_names_param() {
        let mut resolver = Resolver::default();
        let err = resolve(&mut resolver, "LRUCache:capacity=big", ComponentRole::BlockCache)
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Type { ref option, ref raw_value, .. }
                if option == "LRUCache.capacity" && raw_value == "big"
        ));
    }

    #[test]
    fn test_unknown_param_follows_policy() {
        let mut resolver = Resolver::default();
        let err = resolve(&mut resolver, "LRUCache:colour=red", ComponentRole::BlockCache)
            .unwrap_err();
        assert!(matches!(err, LoadError::UnknownOption { ref key, .. } if key == "LRUCache.colour"));

        let mut log = DiagnosticLog::new(UnknownOptionPolicy::Ignore);
        resolver
            .resolve(
                &ObjectSpec::parse("LRUCache:colour=red"),
                ComponentRole::BlockCache,
                &site(),
                Revision::LATEST,
                &mut log,
            )
            .unwrap();
        let entries = log.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, DiagnosticKind::UnknownOption);
    }

    #[test]
    fn test_string_param_is_unescaped() {
        let mut resolver = Resolver::default();
        let component = resolve(
            &mut resolver,
            r"StringAppendOperator:delimiter=\;",
            ComponentRole::MergeOperator,
        )
        .unwrap();
        assert_eq!(
            component,
            Component::MergeOperator(Arc::new(MergeOperator::StringAppend {
                delimiter: ";".into()
            }))
        );
    }

    #[test]
    fn test_space_delimiter_survives() {
        let mut resolver = Resolver::default();
        for raw in [r"StringAppendOperator:delimiter=\ ;", r"StringAppendOperator:delimiter=\ "] {
            let component = resolve(&mut resolver, raw, ComponentRole::MergeOperator).unwrap();
            assert_eq!(
                component,
                Component::MergeOperator(Arc::new(MergeOperator::StringAppend {
                    delimiter: " ".into()
                })),
                "{raw}"
            );
        }
        assert_eq!(resolver.resolved_count(), 1);
    }
}
