use std::borrow::Cow;
use std::fmt;

use super::convert;
use crate::record::Value;

pub type ConvertError = Box<dyn std::error::Error + Send + Sync>;

/// Turns one raw column value into a typed [`Value`].
///
/// Converters are plain functions: they hold no state and may run on any
/// thread.
pub type Converter = fn(&str) -> Result<Value, ConvertError>;

/// Identifies the target type of a record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    TimeOffset,
    /// A caller-defined type, matched by name.
    Named(Cow<'static, str>),
}

impl TypeTag {
    pub const fn named(name: &'static str) -> Self {
        TypeTag::Named(Cow::Borrowed(name))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Boolean => "boolean",
            TypeTag::Date => "date",
            TypeTag::Time => "time",
            TypeTag::DateTime => "date-time",
            TypeTag::DateTimeOffset => "date-time-offset",
            TypeTag::TimeOffset => "time-offset",
            TypeTag::Named(name) => &**name,
        };
        f.write_str(name)
    }
}

const BUILTIN: &[(TypeTag, Converter)] = &[
    (TypeTag::String, convert::string as Converter),
    (TypeTag::Integer, convert::integer as Converter),
    (TypeTag::Float, convert::float as Converter),
    (TypeTag::Boolean, convert::boolean as Converter),
    (TypeTag::Date, convert::date as Converter),
    (TypeTag::Time, convert::time as Converter),
    (TypeTag::DateTime, convert::date_time as Converter),
    (TypeTag::DateTimeOffset, convert::date_time_offset as Converter),
    (TypeTag::TimeOffset, convert::time_offset as Converter),
];

/// Maps type tags to converters.
///
/// The built-in set is a `'static` table, so the default registry costs
/// nothing to create or clone. Registering copies the table before adding to
/// it; registries never share mutable state.
#[derive(Clone)]
pub struct ConverterRegistry {
    entries: Cow<'static, [(TypeTag, Converter)]>,
}

impl ConverterRegistry {
    pub const fn builtin() -> Self {
        Self { entries: Cow::Borrowed(BUILTIN) }
    }

    pub const fn empty() -> Self {
        Self { entries: Cow::Borrowed(&[]) }
    }

    /// Returns a new registry with `converter` registered for `tag`.
    /// An existing entry for the same tag is replaced.
    pub fn register(&self, tag: TypeTag, converter: Converter) -> Self {
        let mut entries = self.entries.to_vec();
        match entries.iter_mut().find(|(existing, _)| *existing == tag) {
            Some(entry) => entry.1 = converter,
            None => entries.push((tag, converter)),
        }
        Self { entries: Cow::Owned(entries) }
    }

    pub fn get(&self, tag: &TypeTag) -> Option<Converter> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == tag)
            .map(|(_, converter)| *converter)
    }

    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.get(tag).is_some()
    }

    pub fn tags(&self) -> impl Iterator<Item = &TypeTag> {
        self.entries.iter().map(|(tag, _)| tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tags()).finish()
    }
}
