//! Line-oriented section tokenizer.
//!
//! # Responsibilities
//! - Split options text into ordered sections with their entries
//! - Skip blank and `#` comment lines, join `\` continuation lines
//! - Report the first malformed line with its 1-based number
//!
//! # Design Decisions
//! - Values are kept raw; escapes are resolved by the decoder
//! - A repeated key keeps its first position and takes the last value

use serde::Serialize;
use std::fmt;

use crate::format::escape::{ends_with_escape, trim_unescaped};
use crate::loader::LoadError;

/// Kind tag of a section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    Version,
    GlobalOptions,
    ColumnFamilyOptions,
    NestedComponentOptions,
}

impl SectionKind {
    /// Canonical header spelling.
    pub fn header(&self) -> &'static str {
        match self {
            SectionKind::Version => "Version",
            SectionKind::GlobalOptions => "GlobalOptions",
            SectionKind::ColumnFamilyOptions => "ColumnFamilyOptions",
            SectionKind::NestedComponentOptions => "NestedComponentOptions",
        }
    }

    /// Sections that must carry a quoted name.
    pub fn requires_name(&self) -> bool {
        matches!(
            self,
            SectionKind::ColumnFamilyOptions | SectionKind::NestedComponentOptions
        )
    }

    fn from_header(kind: &str) -> Option<(Self, Option<&str>)> {
        if let Some((prefix, component)) = kind.split_once('/') {
            return match prefix {
                "TableOptions" | "NestedComponentOptions" => {
                    Some((SectionKind::NestedComponentOptions, Some(component)))
                }
                _ => None,
            };
        }
        match kind {
            "Version" => Some((SectionKind::Version, None)),
            "GlobalOptions" | "DBOptions" => Some((SectionKind::GlobalOptions, None)),
            "ColumnFamilyOptions" | "CFOptions" => Some((SectionKind::ColumnFamilyOptions, None)),
            "NestedComponentOptions" | "TableOptions" => {
                Some((SectionKind::NestedComponentOptions, None))
            }
            _ => None,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One `key=value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    /// Trimmed, still escaped.
    pub value: String,
    pub line: usize,
}

/// A header and the entries that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// Component type named after `/` in a nested header, if any.
    pub component: Option<String>,
    pub name: Option<String>,
    /// Line of the header.
    pub line: usize,
    pub entries: Vec<Entry>,
}

impl Section {
    fn push(&mut self, entry: Entry) {
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => {
                tracing::debug!(
                    section = %self.kind,
                    key = %entry.key,
                    first_line = existing.line,
                    line = entry.line,
                    "Duplicate key, keeping the last value"
                );
                existing.value = entry.value;
                existing.line = entry.line;
            }
            None => self.entries.push(entry),
        }
    }

    /// Value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

fn syntax(line: usize, reason: impl Into<String>) -> LoadError {
    LoadError::Syntax {
        line,
        reason: reason.into(),
    }
}

fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Split options text into sections.
pub fn tokenize(text: &str) -> Result<Vec<Section>, LoadError> {
    let mut sections: Vec<Section> = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let lineno = idx + 1;
        let start = raw.trim_start();
        if start.trim_end().is_empty() || start.starts_with('#') {
            continue;
        }

        // Only a backslash that ends the raw line continues it; `\ ` is an
        // escaped space.
        let mut joined = start.to_string();
        while ends_with_escape(&joined) {
            joined.pop();
            match lines.next() {
                Some((_, next)) => joined.push_str(next.trim_start()),
                None => return Err(syntax(lineno, "line continuation at end of input")),
            }
        }
        let line = trim_unescaped(&joined);

        if line.starts_with('[') {
            sections.push(parse_header(line, lineno)?);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(syntax(
                lineno,
                format!("expected `key=value` or a section header, found {line:?}"),
            ));
        };
        let key = key.trim();
        if !valid_key(key) {
            return Err(syntax(lineno, format!("invalid option name {key:?}")));
        }
        let Some(section) = sections.last_mut() else {
            return Err(syntax(lineno, format!("option {key:?} appears before any section header")));
        };
        section.push(Entry {
            key: key.to_string(),
            value: trim_unescaped(value).to_string(),
            line: lineno,
        });
    }

    Ok(sections)
}

fn parse_header(line: &str, lineno: usize) -> Result<Section, LoadError> {
    let Some(inner) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) else {
        return Err(syntax(lineno, "unterminated section header"));
    };
    let inner = inner.trim();
    let split = inner
        .find(|c: char| c.is_whitespace() || c == '"')
        .unwrap_or(inner.len());
    let (kind_text, rest) = inner.split_at(split);

    let Some((kind, component)) = SectionKind::from_header(kind_text) else {
        return Err(syntax(lineno, format!("unknown section kind {kind_text:?}")));
    };
    if component == Some("") {
        return Err(syntax(lineno, format!("missing component type in {kind_text:?}")));
    }

    let rest = rest.trim();
    let name = if rest.is_empty() {
        None
    } else {
        Some(parse_quoted(rest).ok_or_else(|| {
            syntax(lineno, format!("section name must be a quoted string, found {rest:?}"))
        })?)
    };

    match &name {
        None if kind.requires_name() => {
            return Err(syntax(lineno, format!("[{kind}] section requires a name")));
        }
        Some(n) if n.is_empty() => return Err(syntax(lineno, "empty section name")),
        _ => {}
    }

    Ok(Section {
        kind,
        component: component.map(str::to_string),
        name,
        line: lineno,
        entries: Vec::new(),
    })
}

/// `"..."` with `\"` and `\\` escapes; nothing may follow the closing quote.
fn parse_quoted(text: &str) -> Option<String> {
    let body = text.strip_prefix('"')?;
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?.1),
            '"' => return body[idx + 1..].trim().is_empty().then_some(out),
            c => out.push(c),
        }
    }
    None
}
