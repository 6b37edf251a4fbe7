//! Declared option types and decoded values.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::cache::SharedCache;
use crate::options::components::{
    Comparator, Component, ComponentRole, FilterPolicy, MemtableFactory, MergeOperator, ObjectSpec,
    SliceTransform,
};

/// Declared type of an option, as recorded in the schema tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionType {
    Bool,
    /// Boolean that also accepts `1` / `0`.
    LegacyBool,
    Int32,
    UInt32,
    Int64,
    UInt64,
    SizeT,
    Double,
    String,
    /// Closed symbol set.
    Enum(&'static [&'static str]),
    /// `:`-separated homogeneous list.
    List(&'static OptionType),
    /// `TypeName:key=value;...` resolved to a shared handle.
    Component(ComponentRole),
    /// Inline `{key=value;...}` block applied to the nested table options.
    Struct,
    /// Accepted for compatibility, value ignored.
    Deprecated,
}

impl OptionType {
    /// Human-readable type, used in type errors.
    pub fn describe(&self) -> String {
        match self {
            OptionType::Bool => "bool (true/false)".to_string(),
            OptionType::LegacyBool => "bool (true/false/1/0)".to_string(),
            OptionType::Int32 => "int32".to_string(),
            OptionType::UInt32 => "uint32".to_string(),
            OptionType::Int64 => "int64".to_string(),
            OptionType::UInt64 => "uint64".to_string(),
            OptionType::SizeT => "size_t".to_string(),
            OptionType::Double => "double".to_string(),
            OptionType::String => "string".to_string(),
            OptionType::Enum(symbols) => format!("one of [{}]", symbols.join(", ")),
            OptionType::List(elem) => format!("list of {}", elem.describe()),
            OptionType::Component(role) => format!("{role} spec or nullptr"),
            OptionType::Struct => "{key=value;...} block".to_string(),
            OptionType::Deprecated => "anything (deprecated)".to_string(),
        }
    }
}

/// A decoded option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    Str(String),
    Symbol(&'static str),
    List(Vec<OptionValue>),
    /// Unresolved component reference.
    Spec(ObjectSpec),
    Component(Component),
    /// `nullptr`: no component.
    Null,
    /// Raw entries of an inline block, still escaped.
    Entries(Vec<(String, String)>),
}

/// Options-file schema revision (`options_file_version`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Revision {
    pub major: u32,
    pub minor: u32,
}

impl Revision {
    pub const LEGACY: Revision = Revision { major: 1, minor: 0 };
    pub const LATEST: Revision = Revision { major: 1, minor: 1 };

    /// Parse `major.minor`.
    pub fn parse(text: &str) -> Option<Self> {
        let (major, minor) = text.trim().split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    pub fn is_supported(&self) -> bool {
        self.major == Self::LATEST.major
    }

    /// Files older than the latest revision may spell every boolean `1`/`0`.
    pub fn numeric_bools(&self) -> bool {
        *self < Self::LATEST
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Conversion between a model field and [`OptionValue`].
pub trait OptionField: Sized {
    fn from_value(value: OptionValue) -> Option<Self>;
    fn to_value(&self) -> OptionValue;
}

impl OptionField for bool {
    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn to_value(&self) -> OptionValue {
        OptionValue::Bool(*self)
    }
}

macro_rules! signed_field {
    ($($t:ty),+) => {$(
        impl OptionField for $t {
            fn from_value(value: OptionValue) -> Option<Self> {
                match value {
                    OptionValue::Int(v) => <$t>::try_from(v).ok(),
                    _ => None,
                }
            }

            fn to_value(&self) -> OptionValue {
                OptionValue::Int(i64::from(*self))
            }
        }
    )+};
}

macro_rules! unsigned_field {
    ($($t:ty),+) => {$(
        impl OptionField for $t {
            fn from_value(value: OptionValue) -> Option<Self> {
                match value {
                    OptionValue::UInt(v) => <$t>::try_from(v).ok(),
                    _ => None,
                }
            }

            fn to_value(&self) -> OptionValue {
                OptionValue::UInt(*self as u64)
            }
        }
    )+};
}

signed_field!(i32, i64);
unsigned_field!(u32, u64, usize);

impl OptionField for f64 {
    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Double(v) => Some(v),
            _ => None,
        }
    }

    fn to_value(&self) -> OptionValue {
        OptionValue::Double(*self)
    }
}

impl OptionField for String {
    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn to_value(&self) -> OptionValue {
        OptionValue::Str(self.clone())
    }
}

impl<T: OptionField> OptionField for Vec<T> {
    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    fn to_value(&self) -> OptionValue {
        OptionValue::List(self.iter().map(OptionField::to_value).collect())
    }
}

/// Optional components: `nullptr` maps to `None`.
impl<T: OptionField> OptionField for Option<T> {
    fn from_value(value: OptionValue) -> Option<Self> {
        match value {
            OptionValue::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn to_value(&self) -> OptionValue {
        match self {
            Some(inner) => inner.to_value(),
            None => OptionValue::Null,
        }
    }
}

macro_rules! component_field {
    ($($t:ty => $variant:ident),+ $(,)?) => {$(
        impl OptionField for $t {
            fn from_value(value: OptionValue) -> Option<Self> {
                match value {
                    OptionValue::Component(Component::$variant(inner)) => Some(inner),
                    _ => None,
                }
            }

            fn to_value(&self) -> OptionValue {
                OptionValue::Component(Component::$variant(self.clone()))
            }
        }
    )+};
}

component_field!(
    SharedCache => Cache,
    Arc<FilterPolicy> => FilterPolicy,
    Arc<Comparator> => Comparator,
    Arc<SliceTransform> => PrefixExtractor,
    Arc<MergeOperator> => MergeOperator,
    Arc<MemtableFactory> => MemtableFactory,
);

/// Declares an enum-typed option: the Rust enum, its symbol table, and the
/// conversions the schema needs.
macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $($variant:ident => $symbol:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const SYMBOLS: &'static [&'static str] = &[$($symbol),+];

            pub fn symbol(&self) -> &'static str {
                match self {
                    $($name::$variant => $symbol),+
                }
            }

            pub fn from_symbol(symbol: &str) -> Option<Self> {
                match symbol {
                    $($symbol => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.symbol())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.symbol())
            }
        }

        impl $crate::options::types::OptionField for $name {
            fn from_value(value: $crate::options::types::OptionValue) -> Option<Self> {
                match value {
                    $crate::options::types::OptionValue::Symbol(s) => Self::from_symbol(s),
                    _ => None,
                }
            }

            fn to_value(&self) -> $crate::options::types::OptionValue {
                $crate::options::types::OptionValue::Symbol(self.symbol())
            }
        }
    };
}

pub(crate) use option_enum;
