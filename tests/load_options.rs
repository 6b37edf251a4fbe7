//! End-to-end loads of options files.

mod common;

use std::path::Path;
use std::sync::Arc;

use options_loader::env::{MemEnv, SharedEnv};
use options_loader::format::{render, SectionKind};
use options_loader::loader::{load, parse, DiagnosticKind, LoadContext, LoadError};
use options_loader::options::{
    CompressionType, FilterPolicy, IndexType, MergeOperator, SliceTransform,
};

#[test]
fn test_load_engine_fixture_with_supplied_cache() {
    let env = SharedEnv::default_env();
    let cache = common::lru_cache_1000();

    let result = load(&common::fixture("OPTIONS-000005"), &env, true, Some(&cache)).unwrap();

    assert!(result.global.env.same_instance(&env));
    assert!(result.global.create_if_missing);
    assert_eq!(result.global.max_background_jobs, 4);
    assert_eq!(result.version.as_ref().unwrap().rocksdb_version, "6.2.4");
    assert_eq!(result.column_family_names(), vec!["default", "events"]);

    for family in &result.column_families {
        let block_cache = family.options.table_options.block_cache.as_ref().unwrap();
        assert!(block_cache.same_instance(&cache), "family {}", family.name);
        assert_eq!(block_cache.capacity(), 1000);
    }

    let default = result.default_column_family().unwrap();
    assert_eq!(default.max_write_buffer_number, 4);
    assert_eq!(default.compression_per_level.len(), 7);
    assert_eq!(default.compression_per_level[6], CompressionType::Zstd);
    assert_eq!(default.table_options.index_type, IndexType::TwoLevelIndexSearch);
    assert_eq!(default.table_options.block_size, 16384);

    let events = result.column_family("events").unwrap();
    assert_eq!(events.compression, CompressionType::Zstd);
    assert_eq!(events.prefix_extractor.as_deref(), Some(&SliceTransform::FixedPrefix(8)));
    assert_eq!(
        events.merge_operator.as_deref(),
        Some(&MergeOperator::StringAppend {
            delimiter: ";".into()
        })
    );
    assert_eq!(events.ttl, 86400);
}

#[test]
fn test_fixture_reports_obsolete_keys() {
    let env = SharedEnv::default_env();
    let result = load(&common::fixture("OPTIONS-000005"), &env, true, None).unwrap();

    let obsolete: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::ObsoleteOption)
        .map(|d| d.key.as_str())
        .collect();
    assert_eq!(obsolete, vec!["allow_os_buffer", "max_mem_compaction_level"]);
}

#[test]
fn test_identical_specs_resolve_to_one_instance() {
    let env = SharedEnv::default_env();
    let result = load(&common::fixture("OPTIONS-000005"), &env, true, None).unwrap();

    let default = &result.default_column_family().unwrap().table_options;
    let events = &result.column_family("events").unwrap().table_options;

    let (a, b) = (
        default.block_cache.as_ref().unwrap(),
        events.block_cache.as_ref().unwrap(),
    );
    assert!(a.same_instance(b));
    assert_eq!(a.capacity(), 33_554_432);

    let (fa, fb) = (
        default.filter_policy.as_ref().unwrap(),
        events.filter_policy.as_ref().unwrap(),
    );
    assert!(Arc::ptr_eq(fa, fb));
    assert_eq!(
        **fa,
        FilterPolicy::Bloom {
            bits_per_key: 10.0,
            use_block_based_builder: false
        }
    );
}

#[test]
fn test_strict_and_tolerant_unknown_keys() {
    let text = "\
[DBOptions]
  create_if_missing=true
  shiny_new_option=42
[CFOptions \"default\"]
  num_levels=4
";
    let (env, path) = common::mem_env_with(text);

    let err = load(&path, &env, true, None).unwrap_err();
    match err {
        LoadError::UnknownOption { section, name, key } => {
            assert_eq!(section, SectionKind::GlobalOptions);
            assert_eq!(name, None);
            assert_eq!(key, "shiny_new_option");
        }
        other => panic!("expected unknown option, got {other:?}"),
    }

    let result = load(&path, &env, false, None).unwrap();
    assert!(result.global.create_if_missing);
    assert_eq!(result.default_column_family().unwrap().num_levels, 4);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UnknownOption);
    assert_eq!(result.diagnostics[0].line, 3);

    let without_key = text.replace("  shiny_new_option=42\n", "");
    let (env, path) = common::mem_env_with(&without_key);
    let clean = load(&path, &env, true, None).unwrap();
    assert_eq!(result.global, clean.global);
    assert_eq!(result.column_families, clean.column_families);
    assert!(clean.diagnostics.is_empty());
}

#[test]
fn test_default_family_synthesized_last() {
    let text = "[ColumnFamilyOptions \"a\"]\nnum_levels=3\n[ColumnFamilyOptions \"b\"]\n";
    let (env, path) = common::mem_env_with(text);
    let result = load(&path, &env, true, None).unwrap();

    assert_eq!(result.column_family_names(), vec!["a", "b", "default"]);
    assert_eq!(
        result.default_column_family().unwrap(),
        &options_loader::ColumnFamilyOptions::default()
    );
}

#[test]
fn test_duplicate_family_rejected_even_without_conflict() {
    let text = "\
[CFOptions \"x\"]
num_levels=4
[CFOptions \"y\"]
[CFOptions \"x\"]
";
    let (env, path) = common::mem_env_with(text);
    let err = load(&path, &env, true, None).unwrap_err();
    assert!(matches!(err, LoadError::DuplicateColumnFamily { ref name } if name == "x"));
}

#[test]
fn test_last_value_wins() {
    let text = "[DBOptions]\nmax_open_files=10\nmax_open_files=20\n";
    let result = parse(text, &LoadContext::default()).unwrap();
    assert_eq!(result.global.max_open_files, 20);
}

#[test]
fn test_escaped_trailing_space_keeps_next_line() {
    let text = "[DBOptions]\nwal_dir=logs\\ \ncreate_if_missing=true\n";
    let result = parse(text, &LoadContext::default()).unwrap();
    assert_eq!(result.global.wal_dir, "logs ");
    assert!(result.global.create_if_missing);
}

#[test]
fn test_first_error_is_reported() {
    let text = "\
[DBOptions]
  max_open_files=lots
  bogus_key=1
this line is not valid
";
    let err = parse(text, &LoadContext::default()).unwrap_err();
    // The tokenizer runs over the whole file first.
    assert!(matches!(err, LoadError::Syntax { line: 4, .. }));

    let text = "[DBOptions]\n  max_open_files=lots\n  bogus_key=1\n";
    let err = parse(text, &LoadContext::default()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Type { ref option, ref raw_value, .. }
            if option == "max_open_files" && raw_value == "lots"
    ));
}

#[test]
fn test_unresolvable_component() {
    let text = "[TableOptions/BlockBasedTable \"default\"]\nfilter_policy=CuckooFilter:bits=4\n";
    let err = parse(text, &LoadContext::default()).unwrap_err();
    assert!(matches!(err, LoadError::Resolution { ref type_id } if type_id == "CuckooFilter"));
}

#[test]
fn test_supplied_cache_not_used_for_nullptr() {
    let text = "[TableOptions/BlockBasedTable \"default\"]\nblock_cache=nullptr\n";
    let ctx = LoadContext::default().with_cache(common::lru_cache_1000());
    let result = parse(text, &ctx).unwrap();
    assert!(result
        .default_column_family()
        .unwrap()
        .table_options
        .block_cache
        .is_none());
}

#[test]
fn test_supplied_cache_needs_a_block_cache_key() {
    let cache = common::lru_cache_1000();
    let ctx = LoadContext::default().with_cache(cache.clone());
    let before = cache.handle_count();

    let result = parse("[CFOptions \"default\"]\nnum_levels=4\n", &ctx).unwrap();
    assert!(result
        .default_column_family()
        .unwrap()
        .table_options
        .block_cache
        .is_none());
    drop(ctx);
    assert_eq!(cache.handle_count(), before - 1);
}

#[test]
fn test_caller_handles_outlive_load() {
    let cache = common::lru_cache_1000();
    let mem = MemEnv::new();
    mem.write_file("/db/OPTIONS", "[TableOptions/BlockBasedTable \"default\"]\nblock_cache=LRUCache\n");
    let env = SharedEnv::new(mem);

    let before = cache.handle_count();
    let result = load(Path::new("/db/OPTIONS"), &env, true, Some(&cache)).unwrap();
    assert_eq!(cache.handle_count(), before + 1);
    drop(result);
    assert_eq!(cache.handle_count(), before);
    assert_eq!(env.name(), "mem");
}

#[test]
fn test_missing_file() {
    let env = SharedEnv::new(MemEnv::new());
    let err = load(Path::new("/db/OPTIONS-000404"), &env, true, None).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("/db/OPTIONS-000404"));
}

#[test]
fn test_validation_failure() {
    let text = "[CFOptions \"hot\"]\nmax_write_buffer_number=0\n";
    let err = parse(text, &LoadContext::default()).unwrap_err();
    assert!(matches!(err, LoadError::Validation { ref scope, .. } if scope == "column family \"hot\""));
}

#[test]
fn test_continuation_lines() {
    let text = "[CFOptions \"default\"]\ncompression_per_level=kNoCompression:\\\n  kZSTD\n";
    let result = parse(text, &LoadContext::default()).unwrap();
    assert_eq!(
        result.default_column_family().unwrap().compression_per_level,
        vec![CompressionType::None, CompressionType::Zstd]
    );
}

#[test]
fn test_round_trip_through_writer() {
    let env = SharedEnv::default_env();
    let first = load(&common::fixture("OPTIONS-000005"), &env, true, None).unwrap();

    let (_dir, path) = common::write_temp(&render(&first));
    let second = load(&path, &env, true, None).unwrap();

    assert_eq!(first.global, second.global);
    assert_eq!(first.column_families, second.column_families);
    assert!(second.diagnostics.is_empty());
}

#[test]
fn test_json_dump_names_components() {
    let result = parse(
        "[TableOptions/BlockBasedTable \"default\"]\nblock_cache=LRUCache:capacity=64\n",
        &LoadContext::default(),
    )
    .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    let cache = &json["column_families"][0]["options"]["table_options"]["block_cache"];
    assert_eq!(cache["type"], "LRUCache");
    assert_eq!(cache["capacity"], "64");
    assert_eq!(json["global"]["env"], "default");
}
