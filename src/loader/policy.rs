//! Unknown-key policy and non-fatal diagnostics.

use serde::Serialize;

use crate::format::SectionKind;
use crate::loader::error::describe_site;
use crate::loader::LoadError;
use crate::observability::metrics;

/// What to do with keys the schema does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UnknownOptionPolicy {
    /// Abort the load with [`LoadError::UnknownOption`].
    #[default]
    Reject,
    /// Record a diagnostic and skip the key.
    Ignore,
}

impl UnknownOptionPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            UnknownOptionPolicy::Reject
        } else {
            UnknownOptionPolicy::Ignore
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Key not in the schema, skipped under the tolerant policy.
    UnknownOption,
    /// Key the schema still accepts but no longer applies.
    ObsoleteOption,
}

impl DiagnosticKind {
    fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::UnknownOption => "unknown",
            DiagnosticKind::ObsoleteOption => "obsolete",
        }
    }
}

/// A skipped key, reported alongside a successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub section: SectionKind,
    pub name: Option<String>,
    pub key: String,
    pub line: usize,
}

/// Where an entry came from.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub section: SectionKind,
    pub name: Option<&'a str>,
    pub line: usize,
}

/// Applies the unknown-key policy and collects diagnostics for one load.
#[derive(Debug)]
pub struct DiagnosticLog {
    policy: UnknownOptionPolicy,
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new(policy: UnknownOptionPolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
        }
    }

    /// Report a key the schema does not know.
    pub fn unknown(&mut self, site: &Site<'_>, key: &str) -> Result<(), LoadError> {
        match self.policy {
            UnknownOptionPolicy::Reject => Err(LoadError::UnknownOption {
                section: site.section,
                name: site.name.map(str::to_string),
                key: key.to_string(),
            }),
            UnknownOptionPolicy::Ignore => {
                tracing::warn!(
                    section = %describe_site(site.section, site.name),
                    key = %key,
                    line = site.line,
                    "Ignoring unknown option"
                );
                self.record(DiagnosticKind::UnknownOption, site, key);
                Ok(())
            }
        }
    }

    /// Report a key that is accepted but has no effect.
    pub fn obsolete(&mut self, site: &Site<'_>, key: &str) {
        tracing::debug!(
            section = %describe_site(site.section, site.name),
            key = %key,
            line = site.line,
            "Skipping obsolete option"
        );
        self.record(DiagnosticKind::ObsoleteOption, site, key);
    }

    fn record(&mut self, kind: DiagnosticKind, site: &Site<'_>, key: &str) {
        metrics::record_ignored_key(kind.label());
        self.entries.push(Diagnostic {
            kind,
            section: site.section,
            name: site.name.map(str::to_string),
            key: key.to_string(),
            line: site.line,
        });
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site<'static> {
        Site {
            section: SectionKind::GlobalOptions,
            name: None,
            line: 3,
        }
    }

    #[test]
    fn test_reject_policy_fails() {
        let mut log = DiagnosticLog::new(UnknownOptionPolicy::from_strict(true));
        let err = log.unknown(&site(), "bogus").unwrap_err();
        assert!(matches!(err, LoadError::UnknownOption { ref key, .. } if key == "bogus"));
        assert!(log.into_entries().is_empty());
    }

    #[test]
    fn test_ignore_policy_records() {
        let mut log = DiagnosticLog::new(UnknownOptionPolicy::from_strict(false));
        log.unknown(&site(), "bogus").unwrap();
        log.obsolete(&site(), "allow_os_buffer");
        let entries = log.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, DiagnosticKind::UnknownOption);
        assert_eq!(entries[0].line, 3);
        assert_eq!(entries[1].kind, DiagnosticKind::ObsoleteOption);
    }
}
