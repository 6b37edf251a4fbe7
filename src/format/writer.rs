//! Renders a loaded configuration back into options file text.
//!
//! Output reloads into equal option models: every stored option is written
//! in schema order, deprecated keys and inline blocks are left out, and the
//! table options of each family go to its own nested section.

use std::fmt::Write as _;

use crate::format::escape::escape;
use crate::format::SectionKind;
use crate::loader::LoadResult;
use crate::options::registry::OptionsModel;
use crate::options::schema::VersionInfo;
use crate::options::types::OptionValue;

/// Text of one value as it appears after `=`.
pub fn render_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(b) => b.to_string(),
        OptionValue::Int(v) => v.to_string(),
        OptionValue::UInt(v) => v.to_string(),
        OptionValue::Double(v) => v.to_string(),
        OptionValue::Str(s) => escape(s),
        OptionValue::Symbol(s) => (*s).to_string(),
        OptionValue::List(items) => items.iter().map(render_value).collect::<Vec<_>>().join(":"),
        OptionValue::Spec(spec) => spec.to_string(),
        OptionValue::Component(component) => component.describe(),
        OptionValue::Null => "nullptr".to_string(),
        OptionValue::Entries(entries) => {
            let body: Vec<String> = entries.iter().map(|(k, v)| format!("{k}={v}")).collect();
            format!("{{{}}}", body.join(";"))
        }
    }
}

fn header(out: &mut String, kind: SectionKind, name: Option<&str>) {
    match name {
        Some(name) => {
            let quoted = name.replace('\\', "\\\\").replace('"', "\\\"");
            let _ = writeln!(out, "[{kind} \"{quoted}\"]");
        }
        None => {
            let _ = writeln!(out, "[{kind}]");
        }
    }
}

fn body<T: OptionsModel>(out: &mut String, model: &T) {
    for desc in T::schema().iter().filter(|d| d.is_persisted()) {
        let _ = writeln!(out, "  {}={}", desc.name, render_value(&desc.read(model)));
    }
}

/// Render `result` as options file text.
pub fn render(result: &LoadResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Written by {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    out.push('\n');

    let version = result.version.clone().unwrap_or_else(|| VersionInfo {
        options_file_version: result.revision.to_string(),
        ..VersionInfo::default()
    });
    header(&mut out, SectionKind::Version, None);
    body(&mut out, &version);
    out.push('\n');

    header(&mut out, SectionKind::GlobalOptions, None);
    body(&mut out, &result.global);

    for family in &result.column_families {
        out.push('\n');
        header(&mut out, SectionKind::ColumnFamilyOptions, Some(&family.name));
        body(&mut out, &family.options);
        out.push('\n');
        header(&mut out, SectionKind::NestedComponentOptions, Some(&family.name));
        body(&mut out, &family.options.table_options);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{parse, LoadContext};
    use std::sync::Arc;

    use crate::options::components::{Component, MergeOperator};

    #[test]
    fn test_render_values() {
        assert_eq!(render_value(&OptionValue::Double(0.75)), "0.75");
        assert_eq!(render_value(&OptionValue::Double(10.0)), "10");
        assert_eq!(render_value(&OptionValue::Str("a=b".into())), r"a\=b");
        assert_eq!(
            render_value(&OptionValue::List(vec![OptionValue::Int(1), OptionValue::Int(2)])),
            "1:2"
        );
        assert_eq!(render_value(&OptionValue::List(Vec::new())), "");
        assert_eq!(render_value(&OptionValue::Null), "nullptr");
        let op = Component::MergeOperator(Arc::new(MergeOperator::StringAppend {
            delimiter: ";".into(),
        }));
        assert_eq!(
            render_value(&OptionValue::Component(op)),
            r"StringAppendOperator:delimiter=\;"
        );
    }

    #[test]
    fn test_render_reloads_equal() {
        let text = "\
[CFOptions \"with \\\"quotes\\\"\"]
  merge_operator=StringAppendOperator:delimiter=\\;
  prefix_extractor=rocksdb.FixedPrefix.4
[TableOptions/BlockBasedTable \"with \\\"quotes\\\"\"]
  block_cache=LRUCache:capacity=4096
  filter_policy=bloomfilter:10:false
";
        let ctx = LoadContext::default();
        let first = parse(text, &ctx).unwrap();
        let rendered = render(&first);
        let second = parse(&rendered, &ctx).unwrap();
        assert_eq!(first.global, second.global);
        assert_eq!(first.column_families, second.column_families);
        assert!(rendered.contains("[NestedComponentOptions \"default\"]"));
        assert!(!rendered.contains("block_based_table_factory"));
    }

    #[test]
    fn test_edge_whitespace_reloads_equal() {
        let text = concat!(
            "[DBOptions]\n",
            "  wal_dir=\\ leading\n",
            "  db_log_dir=trailing\\ \n",
            "[CFOptions \"default\"]\n",
            "  merge_operator=StringAppendOperator:delimiter=\\ \n",
        );
        let ctx = LoadContext::default();
        let first = parse(text, &ctx).unwrap();
        assert_eq!(first.global.wal_dir, " leading");
        assert_eq!(first.global.db_log_dir, "trailing ");

        let rendered = render(&first);
        assert!(rendered.contains("merge_operator=StringAppendOperator:delimiter=\\ \n"));
        let second = parse(&rendered, &ctx).unwrap();
        assert_eq!(first.global, second.global);
        assert_eq!(first.column_families, second.column_families);
    }
}
