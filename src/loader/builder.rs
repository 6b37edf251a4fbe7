//! Section-by-section model construction.
//!
//! # Responsibilities
//! - Route entries into the global model or the named family's model
//! - Decode each value, resolve component references, store the result
//! - Enforce section-level rules: version placement, duplicate families
//! - Synthesize the `default` family and run cross-field validation
//!
//! # Design Decisions
//! - Families are created lazily on first reference and kept in first-seen
//!   order; a nested section may reference a family before its own section
//! - Duplicate family sections are reported when the build finishes
//! - Builder state lives for exactly one load

use std::collections::HashSet;

use crate::env::SharedEnv;
use crate::format::{Section, SectionKind};
use crate::loader::policy::{DiagnosticLog, Site};
use crate::loader::validation;
use crate::loader::{LoadContext, LoadError, LoadResult};
use crate::options::decode::decode;
use crate::options::registry::OptionsModel;
use crate::options::resolver::Resolver;
use crate::options::schema::{
    BlockBasedTableOptions, ColumnFamilyDescriptor, ColumnFamilyOptions, GlobalOptions,
    VersionInfo, DEFAULT_COLUMN_FAMILY,
};
use crate::options::types::{OptionType, OptionValue, Revision};

/// Nested component types configurable through a nested section.
const TABLE_COMPONENTS: &[&str] = &["BlockBasedTable", "BlockBasedTableFactory"];

/// Per-load decoding state shared by every section.
#[derive(Debug)]
struct Session {
    revision: Revision,
    resolver: Resolver,
    log: DiagnosticLog,
}

impl Session {
    /// Apply one `key=value` to `model`.
    fn assign<T: OptionsModel>(
        &mut self,
        model: &mut T,
        site: &Site<'_>,
        key: &str,
        raw: &str,
    ) -> Result<(), LoadError> {
        let Some(desc) = T::lookup(key) else {
            return self.log.unknown(site, key);
        };

        match desc.ty {
            OptionType::Deprecated => {
                self.log.obsolete(site, key);
                Ok(())
            }
            OptionType::Struct => {
                let OptionValue::Entries(entries) = decode(key, &desc.ty, raw, self.revision)?
                else {
                    return Ok(());
                };
                let Some(table) = model.nested_table() else {
                    return Ok(());
                };
                let nested = Site {
                    section: SectionKind::NestedComponentOptions,
                    ..*site
                };
                for (nested_key, nested_raw) in &entries {
                    self.assign(table, &nested, nested_key, nested_raw)?;
                }
                Ok(())
            }
            ty => {
                let value = decode(key, &ty, raw, self.revision)?;
                let value = self.resolve(value, &ty, site)?;
                desc.apply(model, value)
            }
        }
    }

    /// Replace component specs with resolved handles, element-wise for lists.
    fn resolve(
        &mut self,
        value: OptionValue,
        ty: &OptionType,
        site: &Site<'_>,
    ) -> Result<OptionValue, LoadError> {
        match (value, ty) {
            (OptionValue::Spec(spec), OptionType::Component(role)) => self
                .resolver
                .resolve(&spec, *role, site, self.revision, &mut self.log)
                .map(OptionValue::Component),
            (OptionValue::List(items), OptionType::List(elem)) => items
                .into_iter()
                .map(|item| self.resolve(item, elem, site))
                .collect::<Result<Vec<_>, _>>()
                .map(OptionValue::List),
            (value, _) => Ok(value),
        }
    }
}

/// Accumulates sections into a [`LoadResult`].
#[derive(Debug)]
pub struct ModelBuilder {
    session: Session,
    env: SharedEnv,
    sections_seen: usize,
    version: Option<VersionInfo>,
    global: GlobalOptions,
    families: Vec<ColumnFamilyDescriptor>,
    declared: HashSet<String>,
    duplicate: Option<String>,
}

impl ModelBuilder {
    pub fn new(ctx: &LoadContext) -> Self {
        Self {
            session: Session {
                revision: Revision::LATEST,
                resolver: Resolver::new(ctx.cache.clone()),
                log: DiagnosticLog::new(ctx.unknown_options),
            },
            env: ctx.env.clone(),
            sections_seen: 0,
            version: None,
            global: GlobalOptions::default(),
            families: Vec::new(),
            declared: HashSet::new(),
            duplicate: None,
        }
    }

    pub fn apply_section(&mut self, section: &Section) -> Result<(), LoadError> {
        tracing::debug!(
            kind = %section.kind,
            name = section.name.as_deref().unwrap_or(""),
            line = section.line,
            entries = section.entries.len(),
            "Applying section"
        );
        let first = self.sections_seen == 0;
        self.sections_seen += 1;

        match section.kind {
            SectionKind::Version => self.apply_version(section, first),
            SectionKind::GlobalOptions => {
                let site = site_of(section);
                for entry in &section.entries {
                    let site = Site { line: entry.line, ..site };
                    self.session
                        .assign(&mut self.global, &site, &entry.key, &entry.value)?;
                }
                Ok(())
            }
            SectionKind::ColumnFamilyOptions => {
                let name = section_name(section)?;
                if !self.declared.insert(name.to_string()) && self.duplicate.is_none() {
                    self.duplicate = Some(name.to_string());
                }
                let site = site_of(section);
                let idx = self.family_index(name);
                for entry in &section.entries {
                    let site = Site { line: entry.line, ..site };
                    self.session.assign(
                        &mut self.families[idx].options,
                        &site,
                        &entry.key,
                        &entry.value,
                    )?;
                }
                Ok(())
            }
            SectionKind::NestedComponentOptions => {
                if let Some(component) = &section.component {
                    if !TABLE_COMPONENTS.contains(&component.as_str()) {
                        return Err(LoadError::Resolution {
                            type_id: component.clone(),
                        });
                    }
                }
                let name = section_name(section)?;
                let site = site_of(section);
                let idx = self.family_index(name);
                for entry in &section.entries {
                    let site = Site { line: entry.line, ..site };
                    let table: &mut BlockBasedTableOptions =
                        &mut self.families[idx].options.table_options;
                    self.session.assign(table, &site, &entry.key, &entry.value)?;
                }
                Ok(())
            }
        }
    }

    fn apply_version(&mut self, section: &Section, first: bool) -> Result<(), LoadError> {
        if !first {
            return Err(LoadError::Syntax {
                line: section.line,
                reason: "[Version] must be the first section".to_string(),
            });
        }

        let mut info = VersionInfo::default();
        let site = site_of(section);
        for entry in &section.entries {
            let site = Site { line: entry.line, ..site };
            self.session.assign(&mut info, &site, &entry.key, &entry.value)?;
        }

        let line = section
            .get("options_file_version")
            .map_or(section.line, |e| e.line);
        let revision = info.revision().ok_or_else(|| LoadError::Syntax {
            line,
            reason: format!(
                "options_file_version {:?} is not of the form major.minor",
                info.options_file_version
            ),
        })?;
        if !revision.is_supported() {
            return Err(LoadError::Syntax {
                line,
                reason: format!(
                    "options file version {revision} is not supported (expected {}.x)",
                    Revision::LATEST.major
                ),
            });
        }
        if revision > Revision::LATEST {
            tracing::warn!(
                version = %revision,
                latest = %Revision::LATEST,
                "Options file is newer than this loader, decoding with the latest known schema"
            );
        }

        self.session.revision = revision;
        self.version = Some(info);
        Ok(())
    }

    /// Index of the family named `name`, creating it on first reference.
    fn family_index(&mut self, name: &str) -> usize {
        if let Some(idx) = self.families.iter().position(|f| f.name == name) {
            return idx;
        }
        self.families
            .push(ColumnFamilyDescriptor::new(name, ColumnFamilyOptions::default()));
        self.families.len() - 1
    }

    pub fn finish(mut self) -> Result<LoadResult, LoadError> {
        if let Some(name) = self.duplicate {
            return Err(LoadError::DuplicateColumnFamily { name });
        }

        if !self.families.iter().any(|f| f.name == DEFAULT_COLUMN_FAMILY) {
            tracing::debug!("Synthesizing default column family");
            self.families.push(ColumnFamilyDescriptor::new(
                DEFAULT_COLUMN_FAMILY,
                ColumnFamilyOptions::default(),
            ));
        }

        validation::validate(&self.families)?;

        self.global.env = self.env;
        Ok(LoadResult {
            version: self.version,
            revision: self.session.revision,
            global: self.global,
            column_families: self.families,
            diagnostics: self.session.log.into_entries(),
        })
    }
}

fn site_of(section: &Section) -> Site<'_> {
    Site {
        section: section.kind,
        name: section.name.as_deref(),
        line: section.line,
    }
}

fn section_name(section: &Section) -> Result<&str, LoadError> {
    section.name.as_deref().ok_or_else(|| LoadError::Syntax {
        line: section.line,
        reason: format!("[{}] section requires a name", section.kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tokenize;
    use crate::loader::policy::DiagnosticKind;
    use crate::options::components::FilterPolicy;

    fn build(text: &str, ctx: &LoadContext) -> Result<LoadResult, LoadError> {
        let mut builder = ModelBuilder::new(ctx);
        for section in tokenize(text)? {
            builder.apply_section(&section)?;
        }
        builder.finish()
    }

    #[test]
    fn test_routes_entries() {
        let text = "\
[GlobalOptions]
  max_open_files=100
[ColumnFamilyOptions \"users\"]
  num_levels=5
[NestedComponentOptions \"users\"]
  block_size=8192
";
        let result = build(text, &LoadContext::default()).unwrap();
        assert_eq!(result.global.max_open_files, 100);
        let users = result.column_family("users").unwrap();
        assert_eq!(users.num_levels, 5);
        assert_eq!(users.table_options.block_size, 8192);
        assert_eq!(result.column_family_names(), vec!["users", "default"]);
    }

    #[test]
    fn test_nested_section_creates_family() {
        let text = "[TableOptions/BlockBasedTable \"logs\"]\nblock_size=1024\n";
        let result = build(text, &LoadContext::default()).unwrap();
        assert_eq!(result.column_family("logs").unwrap().table_options.block_size, 1024);
    }

    #[test]
    fn test_unknown_nested_component() {
        let text = "[TableOptions/PlainTable \"logs\"]\nuser_key_len=8\n";
        let err = build(text, &LoadContext::default()).unwrap_err();
        assert!(matches!(err, LoadError::Resolution { ref type_id } if type_id == "PlainTable"));
    }

    #[test]
    fn test_inline_table_block() {
        let text = "\
[ColumnFamilyOptions \"default\"]
  block_based_table_factory={block_size=16384;filter_policy=bloomfilter:10:false}
";
        let result = build(text, &LoadContext::default()).unwrap();
        let table = &result.column_family("default").unwrap().table_options;
        assert_eq!(table.block_size, 16384);
        assert_eq!(
            table.filter_policy.as_deref(),
            Some(&FilterPolicy::Bloom {
                bits_per_key: 10.0,
                use_block_based_builder: false
            })
        );
    }

    #[test]
    fn test_inline_block_unknown_key_is_nested_site() {
        let text = "[ColumnFamilyOptions \"default\"]\nblock_based_table_factory={colour=red}\n";
        let err = build(text, &LoadContext::default()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnknownOption { section: SectionKind::NestedComponentOptions, ref key, .. }
                if key == "colour"
        ));
    }

    #[test]
    fn test_version_must_come_first() {
        let text = "[GlobalOptions]\n[Version]\noptions_file_version=1.1\n";
        let err = build(text, &LoadContext::default()).unwrap_err();
        assert!(matches!(err, LoadError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_unsupported_version() {
        let text = "[Version]\n  rocksdb_version=9.0.0\n  options_file_version=2.0\n";
        let err = build(text, &LoadContext::default()).unwrap_err();
        assert!(matches!(err, LoadError::Syntax { line: 3, .. }));

        let text = "[Version]\noptions_file_version=latest\n";
        assert!(build(text, &LoadContext::default()).is_err());
    }

    #[test]
    fn test_legacy_revision_accepts_numeric_bools() {
        let text = "[Version]\noptions_file_version=1.0\n[DBOptions]\ncreate_if_missing=1\n";
        let result = build(text, &LoadContext::default()).unwrap();
        assert!(result.global.create_if_missing);
        assert_eq!(result.revision, Revision::LEGACY);

        let text = "[DBOptions]\ncreate_if_missing=1\n";
        assert!(matches!(
            build(text, &LoadContext::default()).unwrap_err(),
            LoadError::Type { .. }
        ));
    }

    #[test]
    fn test_duplicate_family_detected_at_finish() {
        let text = "\
[ColumnFamilyOptions \"x\"]
num_levels=4
[ColumnFamilyOptions \"x\"]
num_levels=4
";
        let err = build(text, &LoadContext::default()).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateColumnFamily { ref name } if name == "x"));
    }

    #[test]
    fn test_deprecated_key_recorded() {
        let text = "[DBOptions]\nallow_os_buffer=true\n";
        let result = build(text, &LoadContext::default()).unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::ObsoleteOption);
        assert_eq!(result.diagnostics[0].line, 2);
    }

    #[test]
    fn test_compression_list() {
        let text = "[CFOptions \"default\"]\ncompression_per_level=kNoCompression:kZSTD\n";
        let result = build(text, &LoadContext::default()).unwrap();
        assert_eq!(
            result.default_column_family().unwrap().compression_per_level,
            vec![
                crate::options::CompressionType::None,
                crate::options::CompressionType::Zstd
            ]
        );
    }

    #[test]
    fn test_env_is_callers() {
        let env = SharedEnv::new(crate::env::MemEnv::new());
        let ctx = LoadContext::new(env.clone());
        let result = build("", &ctx).unwrap();
        assert!(result.global.env.same_instance(&env));
    }
}
