//! Load errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::format::SectionKind;

/// Terminal failure of one load call. Only the first error is reported.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The options file could not be read.
    #[error("failed to read options file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed header or entry, or a misplaced/unsupported version section.
    #[error("syntax error at line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    /// A value does not match the option's declared type.
    #[error("invalid value {raw_value:?} for option `{option}`: expected {expected}")]
    Type {
        option: String,
        raw_value: String,
        expected: String,
    },

    /// Unrecognized key under the strict policy.
    #[error("unknown option `{key}` in {}", site_label(.section, .name))]
    UnknownOption {
        section: SectionKind,
        name: Option<String>,
        key: String,
    },

    /// A component reference names no known factory.
    #[error("cannot resolve component type {type_id:?}")]
    Resolution { type_id: String },

    /// Two column family sections share a name.
    #[error("column family {name:?} is defined more than once")]
    DuplicateColumnFamily { name: String },

    /// Options are individually valid but inconsistent with each other.
    #[error("invalid {scope}: {reason}")]
    Validation { scope: String, reason: String },
}

/// `[Kind "name"]` for messages.
pub fn describe_site(section: SectionKind, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("[{section} {name:?}]"),
        None => format!("[{section}]"),
    }
}

fn site_label(section: &SectionKind, name: &Option<String>) -> String {
    describe_site(*section, name.as_deref())
}

impl LoadError {
    /// Short machine-friendly label, used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::Io { .. } => "io",
            LoadError::Syntax { .. } => "syntax",
            LoadError::Type { .. } => "type",
            LoadError::UnknownOption { .. } => "unknown_option",
            LoadError::Resolution { .. } => "resolution",
            LoadError::DuplicateColumnFamily { .. } => "duplicate_column_family",
            LoadError::Validation { .. } => "validation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::Syntax {
            line: 7,
            reason: "unterminated section header".into(),
        };
        assert_eq!(err.to_string(), "syntax error at line 7: unterminated section header");

        let err = LoadError::UnknownOption {
            section: SectionKind::ColumnFamilyOptions,
            name: Some("users".into()),
            key: "bogus".into(),
        };
        assert_eq!(
            err.to_string(),
            "unknown option `bogus` in [ColumnFamilyOptions \"users\"]"
        );

        let err = LoadError::Type {
            option: "num_levels".into(),
            raw_value: "seven".into(),
            expected: "int32".into(),
        };
        assert!(err.to_string().contains("\"seven\""));
        assert_eq!(err.kind(), "type");
    }
}
