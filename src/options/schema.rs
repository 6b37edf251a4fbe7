//! Option model definitions.
//!
//! This module defines the strongly-typed option groups a load produces.
//! Every field is listed in the matching table in `registry.rs`, under the
//! same name it has in options files.

use serde::Serialize;
use std::sync::Arc;

use crate::cache::SharedCache;
use crate::env::SharedEnv;
use crate::options::components::{
    Comparator, FilterPolicy, MemtableFactory, MergeOperator, SliceTransform,
};
use crate::options::enums::{
    AccessHint, ChecksumType, CompactionPri, CompactionStyle, CompressionType, DataBlockIndexType,
    IndexType, InfoLogLevel, TableFactory, WalRecoveryMode,
};
use crate::options::types::Revision;

/// Name of the column family engines require to exist.
pub const DEFAULT_COLUMN_FAMILY: &str = "default";

/// Contents of the `[Version]` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionInfo {
    /// Engine release that wrote the file. Informational.
    pub rocksdb_version: String,

    /// Options-file schema revision, `major.minor`.
    pub options_file_version: String,
}

impl VersionInfo {
    pub fn revision(&self) -> Option<Revision> {
        Revision::parse(&self.options_file_version)
    }
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            rocksdb_version: String::new(),
            options_file_version: Revision::LATEST.to_string(),
        }
    }
}

/// Engine-wide options (`[GlobalOptions]` / `[DBOptions]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalOptions {
    /// I/O backend; always the env the load was given.
    pub env: SharedEnv,

    pub create_if_missing: bool,
    pub create_missing_column_families: bool,
    pub error_if_exists: bool,
    pub paranoid_checks: bool,
    pub use_fsync: bool,
    pub allow_mmap_reads: bool,
    pub allow_mmap_writes: bool,
    pub use_direct_reads: bool,
    pub use_direct_io_for_flush_and_compaction: bool,
    pub is_fd_close_on_exec: bool,
    pub advise_random_on_open: bool,
    pub allow_concurrent_memtable_write: bool,
    pub enable_write_thread_adaptive_yield: bool,
    pub enable_pipelined_write: bool,
    pub unordered_write: bool,
    pub two_write_queues: bool,
    pub manual_wal_flush: bool,
    pub atomic_flush: bool,
    pub avoid_flush_during_recovery: bool,
    pub avoid_flush_during_shutdown: bool,
    pub allow_ingest_behind: bool,
    pub dump_malloc_stats: bool,
    pub enable_thread_tracking: bool,
    pub fail_if_options_file_error: bool,
    pub skip_stats_update_on_db_open: bool,
    pub skip_checking_sst_file_sizes_on_db_open: bool,

    /// `-1` keeps every file open.
    pub max_open_files: i32,
    pub max_file_opening_threads: i32,
    pub max_background_jobs: i32,
    pub max_background_compactions: i32,
    pub max_background_flushes: i32,
    pub table_cache_numshardbits: i32,

    pub max_subcompactions: u32,
    pub stats_dump_period_sec: u32,
    pub stats_persist_period_sec: u32,

    pub max_total_wal_size: u64,
    pub delete_obsolete_files_period_micros: u64,
    pub bytes_per_sync: u64,
    pub wal_bytes_per_sync: u64,
    pub max_manifest_file_size: u64,
    pub wal_ttl_seconds: u64,
    pub wal_size_limit_mb: u64,
    pub delayed_write_rate: u64,
    pub max_log_file_size: u64,
    pub log_file_time_to_roll: u64,
    pub write_thread_max_yield_usec: u64,
    pub write_thread_slow_yield_usec: u64,

    pub db_write_buffer_size: usize,
    pub keep_log_file_num: usize,
    pub recycle_log_file_num: usize,
    pub manifest_preallocation_size: usize,
    pub compaction_readahead_size: usize,
    pub writable_file_max_buffer_size: usize,
    pub stats_history_buffer_size: usize,

    pub wal_dir: String,
    pub db_log_dir: String,

    pub wal_recovery_mode: WalRecoveryMode,
    pub info_log_level: InfoLogLevel,
    pub access_hint_on_compaction_start: AccessHint,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            env: SharedEnv::default_env(),
            create_if_missing: false,
            create_missing_column_families: false,
            error_if_exists: false,
            paranoid_checks: true,
            use_fsync: false,
            allow_mmap_reads: false,
            allow_mmap_writes: false,
            use_direct_reads: false,
            use_direct_io_for_flush_and_compaction: false,
            is_fd_close_on_exec: true,
            advise_random_on_open: true,
            allow_concurrent_memtable_write: true,
            enable_write_thread_adaptive_yield: true,
            enable_pipelined_write: false,
            unordered_write: false,
            two_write_queues: false,
            manual_wal_flush: false,
            atomic_flush: false,
            avoid_flush_during_recovery: false,
            avoid_flush_during_shutdown: false,
            allow_ingest_behind: false,
            dump_malloc_stats: false,
            enable_thread_tracking: false,
            fail_if_options_file_error: false,
            skip_stats_update_on_db_open: false,
            skip_checking_sst_file_sizes_on_db_open: false,
            max_open_files: -1,
            max_file_opening_threads: 16,
            max_background_jobs: 2,
            max_background_compactions: -1,
            max_background_flushes: -1,
            table_cache_numshardbits: 6,
            max_subcompactions: 1,
            stats_dump_period_sec: 600,
            stats_persist_period_sec: 600,
            max_total_wal_size: 0,
            delete_obsolete_files_period_micros: 6 * 60 * 60 * 1_000_000,
            bytes_per_sync: 0,
            wal_bytes_per_sync: 0,
            max_manifest_file_size: 1024 * 1024 * 1024,
            wal_ttl_seconds: 0,
            wal_size_limit_mb: 0,
            delayed_write_rate: 16 * 1024 * 1024,
            max_log_file_size: 0,
            log_file_time_to_roll: 0,
            write_thread_max_yield_usec: 100,
            write_thread_slow_yield_usec: 3,
            db_write_buffer_size: 0,
            keep_log_file_num: 1000,
            recycle_log_file_num: 0,
            manifest_preallocation_size: 4 * 1024 * 1024,
            compaction_readahead_size: 0,
            writable_file_max_buffer_size: 1024 * 1024,
            stats_history_buffer_size: 1024 * 1024,
            wal_dir: String::new(),
            db_log_dir: String::new(),
            wal_recovery_mode: WalRecoveryMode::default(),
            info_log_level: InfoLogLevel::default(),
            access_hint_on_compaction_start: AccessHint::default(),
        }
    }
}

/// Options of the block-based table format
/// (`[NestedComponentOptions]` / `[TableOptions/BlockBasedTable]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockBasedTableOptions {
    /// `None` leaves the engine's built-in default cache in place.
    pub block_cache: Option<SharedCache>,
    pub no_block_cache: bool,
    pub block_size: usize,
    pub block_size_deviation: i32,
    pub block_restart_interval: i32,
    pub index_block_restart_interval: i32,
    pub metadata_block_size: u64,
    pub cache_index_and_filter_blocks: bool,
    pub cache_index_and_filter_blocks_with_high_priority: bool,
    pub pin_l0_filter_and_index_blocks_in_cache: bool,
    pub pin_top_level_index_and_filter: bool,
    pub index_type: IndexType,
    pub data_block_index_type: DataBlockIndexType,
    pub data_block_hash_table_util_ratio: f64,
    pub checksum: ChecksumType,
    pub filter_policy: Option<Arc<FilterPolicy>>,
    pub whole_key_filtering: bool,
    pub partition_filters: bool,
    pub format_version: u32,
    pub verify_compression: bool,
    pub read_amp_bytes_per_bit: u32,
    pub enable_index_compression: bool,
    pub block_align: bool,
    pub hash_index_allow_collision: bool,
}

impl Default for BlockBasedTableOptions {
    fn default() -> Self {
        Self {
            block_cache: None,
            no_block_cache: false,
            block_size: 4 * 1024,
            block_size_deviation: 10,
            block_restart_interval: 16,
            index_block_restart_interval: 1,
            metadata_block_size: 4 * 1024,
            cache_index_and_filter_blocks: false,
            cache_index_and_filter_blocks_with_high_priority: true,
            pin_l0_filter_and_index_blocks_in_cache: false,
            pin_top_level_index_and_filter: true,
            index_type: IndexType::default(),
            data_block_index_type: DataBlockIndexType::default(),
            data_block_hash_table_util_ratio: 0.75,
            checksum: ChecksumType::default(),
            filter_policy: None,
            whole_key_filtering: true,
            partition_filters: false,
            format_version: 4,
            verify_compression: false,
            read_amp_bytes_per_bit: 0,
            enable_index_compression: true,
            block_align: false,
            hash_index_allow_collision: true,
        }
    }
}

/// Per column family options (`[ColumnFamilyOptions "name"]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFamilyOptions {
    pub comparator: Arc<Comparator>,
    pub merge_operator: Option<Arc<MergeOperator>>,
    pub prefix_extractor: Option<Arc<SliceTransform>>,
    pub memtable_factory: Arc<MemtableFactory>,
    pub table_factory: TableFactory,
    /// Filled from the family's nested section or its inline
    /// `block_based_table_factory` block.
    pub table_options: BlockBasedTableOptions,

    pub write_buffer_size: usize,
    pub max_write_buffer_number: i32,
    pub min_write_buffer_number_to_merge: i32,
    pub max_write_buffer_number_to_maintain: i32,
    pub num_levels: i32,
    pub level0_file_num_compaction_trigger: i32,
    pub level0_slowdown_writes_trigger: i32,
    pub level0_stop_writes_trigger: i32,
    pub target_file_size_base: u64,
    pub target_file_size_multiplier: i32,
    pub max_bytes_for_level_base: u64,
    pub max_bytes_for_level_multiplier: f64,
    pub max_bytes_for_level_multiplier_additional: Vec<i32>,
    pub level_compaction_dynamic_level_bytes: bool,
    pub max_compaction_bytes: u64,
    pub soft_pending_compaction_bytes_limit: u64,
    pub hard_pending_compaction_bytes_limit: u64,
    pub arena_block_size: usize,
    pub disable_auto_compactions: bool,
    pub compaction_style: CompactionStyle,
    pub compaction_pri: CompactionPri,
    pub compression: CompressionType,
    pub bottommost_compression: CompressionType,
    pub compression_per_level: Vec<CompressionType>,
    pub memtable_prefix_bloom_size_ratio: f64,
    pub memtable_whole_key_filtering: bool,
    pub memtable_huge_page_size: usize,
    pub bloom_locality: u32,
    pub max_successive_merges: usize,
    pub max_sequential_skip_in_iterations: u64,
    pub inplace_update_support: bool,
    pub inplace_update_num_locks: usize,
    pub optimize_filters_for_hits: bool,
    pub paranoid_file_checks: bool,
    pub force_consistency_checks: bool,
    pub report_bg_io_stats: bool,
    pub ttl: u64,
    pub periodic_compaction_seconds: u64,
    pub sample_for_compression: u64,
}

impl Default for ColumnFamilyOptions {
    fn default() -> Self {
        Self {
            comparator: Arc::new(Comparator::Bytewise),
            merge_operator: None,
            prefix_extractor: None,
            memtable_factory: Arc::new(MemtableFactory::default()),
            table_factory: TableFactory::default(),
            table_options: BlockBasedTableOptions::default(),
            write_buffer_size: 64 * 1024 * 1024,
            max_write_buffer_number: 2,
            min_write_buffer_number_to_merge: 1,
            max_write_buffer_number_to_maintain: 0,
            num_levels: 7,
            level0_file_num_compaction_trigger: 4,
            level0_slowdown_writes_trigger: 20,
            level0_stop_writes_trigger: 36,
            target_file_size_base: 64 * 1024 * 1024,
            target_file_size_multiplier: 1,
            max_bytes_for_level_base: 256 * 1024 * 1024,
            max_bytes_for_level_multiplier: 10.0,
            max_bytes_for_level_multiplier_additional: vec![1; 7],
            level_compaction_dynamic_level_bytes: false,
            max_compaction_bytes: 1600 * 1024 * 1024,
            soft_pending_compaction_bytes_limit: 64 * 1024 * 1024 * 1024,
            hard_pending_compaction_bytes_limit: 256 * 1024 * 1024 * 1024,
            arena_block_size: 8 * 1024 * 1024,
            disable_auto_compactions: false,
            compaction_style: CompactionStyle::default(),
            compaction_pri: CompactionPri::default(),
            compression: CompressionType::default(),
            bottommost_compression: CompressionType::Disabled,
            compression_per_level: Vec::new(),
            memtable_prefix_bloom_size_ratio: 0.0,
            memtable_whole_key_filtering: false,
            memtable_huge_page_size: 0,
            bloom_locality: 0,
            max_successive_merges: 0,
            max_sequential_skip_in_iterations: 8,
            inplace_update_support: false,
            inplace_update_num_locks: 10000,
            optimize_filters_for_hits: false,
            paranoid_file_checks: false,
            force_consistency_checks: true,
            report_bg_io_stats: false,
            ttl: 0,
            periodic_compaction_seconds: 0,
            sample_for_compression: 0,
        }
    }
}

/// A column family name paired with its options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFamilyDescriptor {
    pub name: String,
    pub options: ColumnFamilyOptions,
}

impl ColumnFamilyDescriptor {
    pub fn new(name: impl Into<String>, options: ColumnFamilyOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}
