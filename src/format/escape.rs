//! Escape handling shared by the decoder and the writer.
//!
//! A backslash escapes the next character. Splitting helpers skip escaped
//! delimiters and delimiters nested inside `{...}` groups.

/// Characters the writer escapes inside values.
const SPECIAL: &[char] = &['\\', '=', ';', ':', '{', '}', '#'];

/// Resolve backslash escapes (`\n`, `\t`, and `\<char>` for any other char).
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Inverse of [`unescape`] for the characters the grammar treats specially.
///
/// Leading and trailing whitespace is escaped too, since readers trim it.
pub fn escape(value: &str) -> String {
    let body_start = value.len() - value.trim_start().len();
    let body_end = value.trim_end().len();
    let mut out = String::with_capacity(value.len());
    for (idx, c) in value.char_indices() {
        let edge = idx < body_start || idx >= body_end;
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if SPECIAL.contains(&c) || (edge && c.is_whitespace()) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// True when `raw` ends in an unpaired backslash.
pub fn ends_with_escape(raw: &str) -> bool {
    raw.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Trim surrounding whitespace, keeping a trailing whitespace character
/// that a backslash escapes (`a\ ` stays `a\ `).
pub fn trim_unescaped(raw: &str) -> &str {
    let raw = raw.trim_start();
    let mut end = raw.len();
    while let Some(c) = raw[..end].chars().next_back() {
        if !c.is_whitespace() {
            break;
        }
        let start = end - c.len_utf8();
        if ends_with_escape(&raw[..start]) {
            break;
        }
        end = start;
    }
    &raw[..end]
}

/// Byte offsets of every top-level, unescaped occurrence of `delim`.
fn delimiter_positions(raw: &str, delim: char) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;
    let mut depth = 0usize;
    for (idx, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if c == delim && depth == 0 => positions.push(idx),
            _ => {}
        }
    }
    positions
}

/// Split on top-level unescaped `delim`. Escapes are kept in the pieces.
pub fn split_unescaped(raw: &str, delim: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for pos in delimiter_positions(raw, delim) {
        pieces.push(&raw[start..pos]);
        start = pos + delim.len_utf8();
    }
    pieces.push(&raw[start..]);
    pieces
}

/// Split at the first top-level unescaped `delim`.
pub fn split_once_unescaped(raw: &str, delim: char) -> Option<(&str, &str)> {
    delimiter_positions(raw, delim)
        .first()
        .map(|&pos| (&raw[..pos], &raw[pos + delim.len_utf8()..]))
}

/// True when `raw` contains `delim` outside escapes and braces.
pub fn contains_unescaped(raw: &str, delim: char) -> bool {
    !delimiter_positions(raw, delim).is_empty()
}

/// Inner text when the whole value is one `{...}` group.
pub fn strip_braces(raw: &str) -> Option<&str> {
    let raw = trim_unescaped(raw);
    if !raw.starts_with('{') || !raw.ends_with('}') || raw.len() < 2 {
        return None;
    }
    // The opening brace must close at the very end, not earlier ("{a}:{b}").
    let mut escaped = false;
    let mut depth = 0usize;
    for (idx, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return (idx == raw.len() - 1).then(|| &raw[1..idx]);
                }
            }
            _ => {}
        }
    }
    None
}
