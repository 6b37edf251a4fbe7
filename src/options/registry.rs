//! Static option schema.
//!
//! # Responsibilities
//! - Map `(section kind, key)` to a typed descriptor
//! - Move decoded values in and out of the option models
//!
//! # Design Decisions
//! - One `static` table per model, built at compile time and never mutated
//! - Descriptors carry plain `fn` pointers, so the tables need no allocation
//! - Deprecated keys stay in the tables so old files keep loading

use crate::format::SectionKind;
use crate::loader::LoadError;
use crate::options::components::ComponentRole;
use crate::options::enums::{
    AccessHint, ChecksumType, CompactionPri, CompactionStyle, CompressionType, DataBlockIndexType,
    IndexType, InfoLogLevel, TableFactory, WalRecoveryMode,
};
use crate::options::schema::{
    BlockBasedTableOptions, ColumnFamilyOptions, GlobalOptions, VersionInfo,
};
use crate::options::types::{OptionField, OptionType, OptionValue};

/// Schema entry for one option of model `T`.
pub struct OptionDescriptor<T> {
    pub name: &'static str,
    pub ty: OptionType,
    set: fn(&mut T, OptionValue) -> Option<()>,
    get: fn(&T) -> OptionValue,
}

impl<T> OptionDescriptor<T> {
    /// Store a decoded and resolved value. The value must already match `ty`.
    pub fn apply(&self, model: &mut T, value: OptionValue) -> Result<(), LoadError> {
        let shown = format!("{value:?}");
        (self.set)(model, value).ok_or_else(|| LoadError::Type {
            option: self.name.to_string(),
            raw_value: shown,
            expected: self.ty.describe(),
        })
    }

    /// Current value of the option in `model`.
    pub fn read(&self, model: &T) -> OptionValue {
        (self.get)(model)
    }

    /// Options that have a value worth writing back out.
    pub fn is_persisted(&self) -> bool {
        !matches!(self.ty, OptionType::Deprecated | OptionType::Struct)
    }
}

impl<T> std::fmt::Debug for OptionDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish()
    }
}

macro_rules! field {
    ($model:ty, $field:ident, $ty:expr) => {
        OptionDescriptor {
            name: stringify!($field),
            ty: $ty,
            set: |model: &mut $model, value| {
                model.$field = OptionField::from_value(value)?;
                Some(())
            },
            get: |model: &$model| OptionField::to_value(&model.$field),
        }
    };
}

/// Accepted, never stored.
macro_rules! deprecated {
    ($model:ty, $name:literal) => {
        OptionDescriptor {
            name: $name,
            ty: OptionType::Deprecated,
            set: |_: &mut $model, _| Some(()),
            get: |_: &$model| OptionValue::Null,
        }
    };
}

/// A model filled from one kind of section.
pub trait OptionsModel: Sized + 'static {
    const SECTION: SectionKind;

    fn schema() -> &'static [OptionDescriptor<Self>];

    fn lookup(key: &str) -> Option<&'static OptionDescriptor<Self>> {
        Self::schema().iter().find(|d| d.name == key)
    }

    /// Target of inline `{...}` struct options, for models that have one.
    fn nested_table(&mut self) -> Option<&mut BlockBasedTableOptions> {
        None
    }
}

const COMPRESSION: OptionType = OptionType::Enum(CompressionType::SYMBOLS);

static VERSION: &[OptionDescriptor<VersionInfo>] = &[
    field!(VersionInfo, rocksdb_version, OptionType::String),
    field!(VersionInfo, options_file_version, OptionType::String),
];

static GLOBAL: &[OptionDescriptor<GlobalOptions>] = &[
    field!(GlobalOptions, create_if_missing, OptionType::Bool),
    field!(GlobalOptions, create_missing_column_families, OptionType::Bool),
    field!(GlobalOptions, error_if_exists, OptionType::Bool),
    field!(GlobalOptions, paranoid_checks, OptionType::Bool),
    field!(GlobalOptions, use_fsync, OptionType::Bool),
    field!(GlobalOptions, allow_mmap_reads, OptionType::Bool),
    field!(GlobalOptions, allow_mmap_writes, OptionType::Bool),
    field!(GlobalOptions, use_direct_reads, OptionType::Bool),
    field!(GlobalOptions, use_direct_io_for_flush_and_compaction, OptionType::Bool),
    field!(GlobalOptions, is_fd_close_on_exec, OptionType::Bool),
    field!(GlobalOptions, advise_random_on_open, OptionType::Bool),
    field!(GlobalOptions, allow_concurrent_memtable_write, OptionType::Bool),
    field!(GlobalOptions, enable_write_thread_adaptive_yield, OptionType::Bool),
    field!(GlobalOptions, enable_pipelined_write, OptionType::Bool),
    field!(GlobalOptions, unordered_write, OptionType::Bool),
    field!(GlobalOptions, two_write_queues, OptionType::Bool),
    field!(GlobalOptions, manual_wal_flush, OptionType::Bool),
    field!(GlobalOptions, atomic_flush, OptionType::Bool),
    field!(GlobalOptions, avoid_flush_during_recovery, OptionType::Bool),
    field!(GlobalOptions, avoid_flush_during_shutdown, OptionType::Bool),
    field!(GlobalOptions, allow_ingest_behind, OptionType::Bool),
    field!(GlobalOptions, dump_malloc_stats, OptionType::Bool),
    field!(GlobalOptions, enable_thread_tracking, OptionType::Bool),
    field!(GlobalOptions, fail_if_options_file_error, OptionType::Bool),
    field!(GlobalOptions, skip_stats_update_on_db_open, OptionType::LegacyBool),
    field!(GlobalOptions, skip_checking_sst_file_sizes_on_db_open, OptionType::LegacyBool),
    field!(GlobalOptions, max_open_files, OptionType::Int32),
    field!(GlobalOptions, max_file_opening_threads, OptionType::Int32),
    field!(GlobalOptions, max_background_jobs, OptionType::Int32),
    field!(GlobalOptions, max_background_compactions, OptionType::Int32),
    field!(GlobalOptions, max_background_flushes, OptionType::Int32),
    field!(GlobalOptions, table_cache_numshardbits, OptionType::Int32),
    field!(GlobalOptions, max_subcompactions, OptionType::UInt32),
    field!(GlobalOptions, stats_dump_period_sec, OptionType::UInt32),
    field!(GlobalOptions, stats_persist_period_sec, OptionType::UInt32),
    field!(GlobalOptions, max_total_wal_size, OptionType::UInt64),
    field!(GlobalOptions, delete_obsolete_files_period_micros, OptionType::UInt64),
    field!(GlobalOptions, bytes_per_sync, OptionType::UInt64),
    field!(GlobalOptions, wal_bytes_per_sync, OptionType::UInt64),
    field!(GlobalOptions, max_manifest_file_size, OptionType::UInt64),
    field!(GlobalOptions, wal_ttl_seconds, OptionType::UInt64),
    field!(GlobalOptions, wal_size_limit_mb, OptionType::UInt64),
    field!(GlobalOptions, delayed_write_rate, OptionType::UInt64),
    field!(GlobalOptions, max_log_file_size, OptionType::UInt64),
    field!(GlobalOptions, log_file_time_to_roll, OptionType::UInt64),
    field!(GlobalOptions, write_thread_max_yield_usec, OptionType::UInt64),
    field!(GlobalOptions, write_thread_slow_yield_usec, OptionType::UInt64),
    field!(GlobalOptions, db_write_buffer_size, OptionType::SizeT),
    field!(GlobalOptions, keep_log_file_num, OptionType::SizeT),
    field!(GlobalOptions, recycle_log_file_num, OptionType::SizeT),
    field!(GlobalOptions, manifest_preallocation_size, OptionType::SizeT),
    field!(GlobalOptions, compaction_readahead_size, OptionType::SizeT),
    field!(GlobalOptions, writable_file_max_buffer_size, OptionType::SizeT),
    field!(GlobalOptions, stats_history_buffer_size, OptionType::SizeT),
    field!(GlobalOptions, wal_dir, OptionType::String),
    field!(GlobalOptions, db_log_dir, OptionType::String),
    field!(GlobalOptions, wal_recovery_mode, OptionType::Enum(WalRecoveryMode::SYMBOLS)),
    field!(GlobalOptions, info_log_level, OptionType::Enum(InfoLogLevel::SYMBOLS)),
    field!(GlobalOptions, access_hint_on_compaction_start, OptionType::Enum(AccessHint::SYMBOLS)),
    deprecated!(GlobalOptions, "allow_os_buffer"),
    deprecated!(GlobalOptions, "base_background_compactions"),
    deprecated!(GlobalOptions, "new_table_reader_for_compaction_inputs"),
    deprecated!(GlobalOptions, "random_access_max_buffer_size"),
    deprecated!(GlobalOptions, "skip_log_error_on_recovery"),
];

static COLUMN_FAMILY: &[OptionDescriptor<ColumnFamilyOptions>] = &[
    field!(ColumnFamilyOptions, comparator, OptionType::Component(ComponentRole::Comparator)),
    field!(ColumnFamilyOptions, merge_operator, OptionType::Component(ComponentRole::MergeOperator)),
    field!(ColumnFamilyOptions, prefix_extractor, OptionType::Component(ComponentRole::PrefixExtractor)),
    field!(ColumnFamilyOptions, memtable_factory, OptionType::Component(ComponentRole::MemtableFactory)),
    field!(ColumnFamilyOptions, table_factory, OptionType::Enum(TableFactory::SYMBOLS)),
    OptionDescriptor {
        name: "block_based_table_factory",
        ty: OptionType::Struct,
        set: |_: &mut ColumnFamilyOptions, _| Some(()),
        get: |_: &ColumnFamilyOptions| OptionValue::Null,
    },
    field!(ColumnFamilyOptions, write_buffer_size, OptionType::SizeT),
    field!(ColumnFamilyOptions, max_write_buffer_number, OptionType::Int32),
    field!(ColumnFamilyOptions, min_write_buffer_number_to_merge, OptionType::Int32),
    field!(ColumnFamilyOptions, max_write_buffer_number_to_maintain, OptionType::Int32),
    field!(ColumnFamilyOptions, num_levels, OptionType::Int32),
    field!(ColumnFamilyOptions, level0_file_num_compaction_trigger, OptionType::Int32),
    field!(ColumnFamilyOptions, level0_slowdown_writes_trigger, OptionType::Int32),
    field!(ColumnFamilyOptions, level0_stop_writes_trigger, OptionType::Int32),
    field!(ColumnFamilyOptions, target_file_size_base, OptionType::UInt64),
    field!(ColumnFamilyOptions, target_file_size_multiplier, OptionType::Int32),
    field!(ColumnFamilyOptions, max_bytes_for_level_base, OptionType::UInt64),
    field!(ColumnFamilyOptions, max_bytes_for_level_multiplier, OptionType::Double),
    field!(
        ColumnFamilyOptions,
        max_bytes_for_level_multiplier_additional,
        OptionType::List(&OptionType::Int32)
    ),
    field!(ColumnFamilyOptions, level_compaction_dynamic_level_bytes, OptionType::Bool),
    field!(ColumnFamilyOptions, max_compaction_bytes, OptionType::UInt64),
    field!(ColumnFamilyOptions, soft_pending_compaction_bytes_limit, OptionType::UInt64),
    field!(ColumnFamilyOptions, hard_pending_compaction_bytes_limit, OptionType::UInt64),
    field!(ColumnFamilyOptions, arena_block_size, OptionType::SizeT),
    field!(ColumnFamilyOptions, disable_auto_compactions, OptionType::Bool),
    field!(ColumnFamilyOptions, compaction_style, OptionType::Enum(CompactionStyle::SYMBOLS)),
    field!(ColumnFamilyOptions, compaction_pri, OptionType::Enum(CompactionPri::SYMBOLS)),
    field!(ColumnFamilyOptions, compression, COMPRESSION),
    field!(ColumnFamilyOptions, bottommost_compression, COMPRESSION),
    field!(ColumnFamilyOptions, compression_per_level, OptionType::List(&COMPRESSION)),
    field!(ColumnFamilyOptions, memtable_prefix_bloom_size_ratio, OptionType::Double),
    field!(ColumnFamilyOptions, memtable_whole_key_filtering, OptionType::Bool),
    field!(ColumnFamilyOptions, memtable_huge_page_size, OptionType::SizeT),
    field!(ColumnFamilyOptions, bloom_locality, OptionType::UInt32),
    field!(ColumnFamilyOptions, max_successive_merges, OptionType::SizeT),
    field!(ColumnFamilyOptions, max_sequential_skip_in_iterations, OptionType::UInt64),
    field!(ColumnFamilyOptions, inplace_update_support, OptionType::Bool),
    field!(ColumnFamilyOptions, inplace_update_num_locks, OptionType::SizeT),
    field!(ColumnFamilyOptions, optimize_filters_for_hits, OptionType::Bool),
    field!(ColumnFamilyOptions, paranoid_file_checks, OptionType::Bool),
    field!(ColumnFamilyOptions, force_consistency_checks, OptionType::LegacyBool),
    field!(ColumnFamilyOptions, report_bg_io_stats, OptionType::Bool),
    field!(ColumnFamilyOptions, ttl, OptionType::UInt64),
    field!(ColumnFamilyOptions, periodic_compaction_seconds, OptionType::UInt64),
    field!(ColumnFamilyOptions, sample_for_compression, OptionType::UInt64),
    deprecated!(ColumnFamilyOptions, "max_mem_compaction_level"),
    deprecated!(ColumnFamilyOptions, "soft_rate_limit"),
    deprecated!(ColumnFamilyOptions, "hard_rate_limit"),
    deprecated!(ColumnFamilyOptions, "rate_limit_delay_max_milliseconds"),
    deprecated!(ColumnFamilyOptions, "purge_redundant_kvs_while_flush"),
    deprecated!(ColumnFamilyOptions, "filter_deletes"),
    deprecated!(ColumnFamilyOptions, "verify_checksums_in_compaction"),
    deprecated!(ColumnFamilyOptions, "max_grandparent_overlap_factor"),
    deprecated!(ColumnFamilyOptions, "source_compaction_factor"),
    deprecated!(ColumnFamilyOptions, "expanded_compaction_factor"),
];

static BLOCK_BASED_TABLE: &[OptionDescriptor<BlockBasedTableOptions>] = &[
    field!(BlockBasedTableOptions, block_cache, OptionType::Component(ComponentRole::BlockCache)),
    field!(BlockBasedTableOptions, no_block_cache, OptionType::Bool),
    field!(BlockBasedTableOptions, block_size, OptionType::SizeT),
    field!(BlockBasedTableOptions, block_size_deviation, OptionType::Int32),
    field!(BlockBasedTableOptions, block_restart_interval, OptionType::Int32),
    field!(BlockBasedTableOptions, index_block_restart_interval, OptionType::Int32),
    field!(BlockBasedTableOptions, metadata_block_size, OptionType::UInt64),
    field!(BlockBasedTableOptions, cache_index_and_filter_blocks, OptionType::Bool),
    field!(
        BlockBasedTableOptions,
        cache_index_and_filter_blocks_with_high_priority,
        OptionType::Bool
    ),
    field!(BlockBasedTableOptions, pin_l0_filter_and_index_blocks_in_cache, OptionType::Bool),
    field!(BlockBasedTableOptions, pin_top_level_index_and_filter, OptionType::Bool),
    field!(BlockBasedTableOptions, index_type, OptionType::Enum(IndexType::SYMBOLS)),
    field!(
        BlockBasedTableOptions,
        data_block_index_type,
        OptionType::Enum(DataBlockIndexType::SYMBOLS)
    ),
    field!(BlockBasedTableOptions, data_block_hash_table_util_ratio, OptionType::Double),
    field!(BlockBasedTableOptions, checksum, OptionType::Enum(ChecksumType::SYMBOLS)),
    field!(BlockBasedTableOptions, filter_policy, OptionType::Component(ComponentRole::FilterPolicy)),
    field!(BlockBasedTableOptions, whole_key_filtering, OptionType::Bool),
    field!(BlockBasedTableOptions, partition_filters, OptionType::Bool),
    field!(BlockBasedTableOptions, format_version, OptionType::UInt32),
    field!(BlockBasedTableOptions, verify_compression, OptionType::Bool),
    field!(BlockBasedTableOptions, read_amp_bytes_per_bit, OptionType::UInt32),
    field!(BlockBasedTableOptions, enable_index_compression, OptionType::Bool),
    field!(BlockBasedTableOptions, block_align, OptionType::Bool),
    field!(BlockBasedTableOptions, hash_index_allow_collision, OptionType::LegacyBool),
    deprecated!(BlockBasedTableOptions, "block_cache_compressed"),
];

impl OptionsModel for VersionInfo {
    const SECTION: SectionKind = SectionKind::Version;

    fn schema() -> &'static [OptionDescriptor<Self>] {
        VERSION
    }
}

impl OptionsModel for GlobalOptions {
    const SECTION: SectionKind = SectionKind::GlobalOptions;

    fn schema() -> &'static [OptionDescriptor<Self>] {
        GLOBAL
    }
}

impl OptionsModel for ColumnFamilyOptions {
    const SECTION: SectionKind = SectionKind::ColumnFamilyOptions;

    fn schema() -> &'static [OptionDescriptor<Self>] {
        COLUMN_FAMILY
    }

    fn nested_table(&mut self) -> Option<&mut BlockBasedTableOptions> {
        Some(&mut self.table_options)
    }
}

impl OptionsModel for BlockBasedTableOptions {
    const SECTION: SectionKind = SectionKind::NestedComponentOptions;

    fn schema() -> &'static [OptionDescriptor<Self>] {
        BLOCK_BASED_TABLE
    }
}

/// Name and type of a schema entry, independent of its model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaEntry {
    pub name: &'static str,
    pub ty: OptionType,
}

fn entries<T>(table: &'static [OptionDescriptor<T>]) -> Vec<SchemaEntry> {
    table
        .iter()
        .map(|d| SchemaEntry {
            name: d.name,
            ty: d.ty,
        })
        .collect()
}

/// Every option accepted in sections of `kind`, in schema order.
pub fn schema_for(kind: SectionKind) -> Vec<SchemaEntry> {
    match kind {
        SectionKind::Version => entries(VERSION),
        SectionKind::GlobalOptions => entries(GLOBAL),
        SectionKind::ColumnFamilyOptions => entries(COLUMN_FAMILY),
        SectionKind::NestedComponentOptions => entries(BLOCK_BASED_TABLE),
    }
}

/// Schema entry for `key` in sections of `kind`.
pub fn lookup(kind: SectionKind, key: &str) -> Option<SchemaEntry> {
    schema_for(kind).into_iter().find(|e| e.name == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        for kind in [
            SectionKind::Version,
            SectionKind::GlobalOptions,
            SectionKind::ColumnFamilyOptions,
            SectionKind::NestedComponentOptions,
        ] {
            let schema = schema_for(kind);
            let names: HashSet<_> = schema.iter().map(|e| e.name).collect();
            assert_eq!(names.len(), schema.len(), "duplicate name in {kind}");
        }
    }

    #[test]
    fn test_lookup() {
        let entry = lookup(SectionKind::ColumnFamilyOptions, "num_levels").unwrap();
        assert_eq!(entry.ty, OptionType::Int32);
        assert!(lookup(SectionKind::GlobalOptions, "num_levels").is_none());
        assert_eq!(
            lookup(SectionKind::GlobalOptions, "allow_os_buffer").unwrap().ty,
            OptionType::Deprecated
        );
    }

    #[test]
    fn test_apply_and_read() {
        let mut cf = ColumnFamilyOptions::default();
        let desc = ColumnFamilyOptions::lookup("num_levels").unwrap();
        desc.apply(&mut cf, OptionValue::Int(4)).unwrap();
        assert_eq!(cf.num_levels, 4);
        assert_eq!(desc.read(&cf), OptionValue::Int(4));

        let err = desc.apply(&mut cf, OptionValue::Bool(true)).unwrap_err();
        assert!(matches!(err, LoadError::Type { ref option, .. } if option == "num_levels"));
    }

    #[test]
    fn test_component_field_accepts_null() {
        let mut table = BlockBasedTableOptions::default();
        let desc = BlockBasedTableOptions::lookup("filter_policy").unwrap();
        desc.apply(&mut table, OptionValue::Null).unwrap();
        assert!(table.filter_policy.is_none());
        assert_eq!(desc.read(&table), OptionValue::Null);
    }

    #[test]
    fn test_every_option_reads_back() {
        let global = GlobalOptions::default();
        for desc in GlobalOptions::schema().iter().filter(|d| d.is_persisted()) {
            let mut copy = GlobalOptions::default();
            desc.apply(&mut copy, desc.read(&global)).unwrap();
            assert_eq!(copy, global, "{}", desc.name);
        }
    }
}
