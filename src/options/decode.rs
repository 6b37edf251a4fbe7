//! Raw string → typed value.

use crate::format::escape::{
    split_once_unescaped, split_unescaped, strip_braces, trim_unescaped, unescape,
};
use crate::loader::LoadError;
use crate::options::components::ObjectSpec;
use crate::options::types::{OptionType, OptionValue, Revision};

fn mismatch(option: &str, raw: &str, ty: &OptionType) -> LoadError {
    LoadError::Type {
        option: option.to_string(),
        raw_value: raw.to_string(),
        expected: ty.describe(),
    }
}

/// Decode `raw` as `ty` for the option named `option`.
///
/// Component values come back as [`OptionValue::Spec`]; resolving them is the
/// resolver's job. Inline blocks come back as [`OptionValue::Entries`].
pub fn decode(
    option: &str,
    ty: &OptionType,
    raw: &str,
    revision: Revision,
) -> Result<OptionValue, LoadError> {
    let raw = trim_unescaped(raw);
    let err = || mismatch(option, raw, ty);

    match ty {
        OptionType::Bool | OptionType::LegacyBool => {
            if raw.eq_ignore_ascii_case("true") {
                return Ok(OptionValue::Bool(true));
            }
            if raw.eq_ignore_ascii_case("false") {
                return Ok(OptionValue::Bool(false));
            }
            let numeric = *ty == OptionType::LegacyBool || revision.numeric_bools();
            match raw {
                "1" if numeric => Ok(OptionValue::Bool(true)),
                "0" if numeric => Ok(OptionValue::Bool(false)),
                _ => Err(err()),
            }
        }
        OptionType::Int32 => raw
            .parse::<i32>()
            .map(|v| OptionValue::Int(i64::from(v)))
            .map_err(|_| err()),
        OptionType::Int64 => raw.parse::<i64>().map(OptionValue::Int).map_err(|_| err()),
        OptionType::UInt32 => raw
            .parse::<u32>()
            .map(|v| OptionValue::UInt(u64::from(v)))
            .map_err(|_| err()),
        OptionType::UInt64 => raw.parse::<u64>().map(OptionValue::UInt).map_err(|_| err()),
        OptionType::SizeT => raw
            .parse::<usize>()
            .map(|v| OptionValue::UInt(v as u64))
            .map_err(|_| err()),
        OptionType::Double => raw.parse::<f64>().map(OptionValue::Double).map_err(|_| err()),
        OptionType::String => Ok(OptionValue::Str(unescape(raw))),
        OptionType::Enum(symbols) => symbols
            .iter()
            .find(|s| **s == raw)
            .map(|s| OptionValue::Symbol(*s))
            .ok_or_else(err),
        OptionType::List(elem) => {
            let inner = strip_braces(raw).unwrap_or(raw);
            if inner.trim().is_empty() {
                return Ok(OptionValue::List(Vec::new()));
            }
            split_unescaped(inner, ':')
                .into_iter()
                .map(|item| decode(option, elem, item, revision))
                .collect::<Result<Vec<_>, _>>()
                .map(OptionValue::List)
        }
        OptionType::Component(_) => {
            let inner = trim_unescaped(strip_braces(raw).unwrap_or(raw));
            if inner.is_empty() || inner == "nullptr" {
                Ok(OptionValue::Null)
            } else {
                Ok(OptionValue::Spec(ObjectSpec::parse(inner)))
            }
        }
        OptionType::Struct => {
            let inner = strip_braces(raw).ok_or_else(err)?;
            let mut entries = Vec::new();
            for piece in split_unescaped(inner, ';') {
                let piece = trim_unescaped(piece);
                if piece.is_empty() {
                    continue;
                }
                let (key, value) = split_once_unescaped(piece, '=').ok_or_else(err)?;
                let key = key.trim();
                if key.is_empty() {
                    return Err(err());
                }
                entries.push((key.to_string(), trim_unescaped(value).to_string()));
            }
            Ok(OptionValue::Entries(entries))
        }
        OptionType::Deprecated => Ok(OptionValue::Null),
    }
}
