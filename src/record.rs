use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::registry::TypeTag;
use crate::error::{Error, Result};

/// A time of day with a fixed UTC offset, e.g. `01:02Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetTime {
    pub time: NaiveTime,
    pub offset: FixedOffset,
}

/// A converted column value.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    TimeOffset(OffsetTime),
    /// Produced by converters registered for [`TypeTag::Named`] tags.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Value::Custom(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(inner) => inner.downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::DateTimeOffset(a), Value::DateTimeOffset(b)) => a == b,
            (Value::TimeOffset(a), Value::TimeOffset(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Date(d) => serializer.collect_str(d),
            Value::Time(t) => serializer.collect_str(t),
            Value::DateTime(dt) => serializer.collect_str(&dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::DateTimeOffset(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Value::TimeOffset(t) => serializer.collect_str(&format_args!("{}{}", t.time, t.offset)),
            Value::Custom(_) => serializer.serialize_unit(),
        }
    }
}

/// Extracts a typed value out of a [`Value`].
pub trait FromValue: Sized {
    const KIND: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_value {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl FromValue for $ty {
            const KIND: &'static str = $kind;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

from_value!(String, String, "string");
from_value!(i64, Integer, "integer");
from_value!(f64, Float, "float");
from_value!(bool, Boolean, "boolean");
from_value!(NaiveDate, Date, "date");
from_value!(NaiveTime, Time, "time");
from_value!(NaiveDateTime, DateTime, "date-time");
from_value!(DateTime<FixedOffset>, DateTimeOffset, "date-time-offset");
from_value!(OffsetTime, TimeOffset, "time-offset");

/// One field of a [`RecordDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub tag: TypeTag,
    /// Header column to read instead of the one named like the field.
    pub column: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self { name: name.into(), tag, column: None }
    }

    pub fn from_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn source_column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    /// Whether `column` names this field, either by override or by field name.
    pub fn references(&self, column: &str) -> bool {
        self.name == column || self.column.as_deref() == Some(column)
    }
}

/// Caller-supplied shape of a record: its fields, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDescriptor {
    fields: Vec<FieldSpec>,
}

impl RecordDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.with_field(FieldSpec::new(name, tag))
    }

    pub fn field_from(
        self,
        name: impl Into<String>,
        tag: TypeTag,
        column: impl Into<String>,
    ) -> Self {
        self.with_field(FieldSpec::new(name, tag).from_column(column))
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Converted values of one data row, in descriptor order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|name| name == field)
            .map(|index| &self.values[index])
    }

    pub fn get_as<T: FromValue>(&self, field: &str) -> Result<T> {
        self.get(field)
            .and_then(T::from_value)
            .ok_or_else(|| Error::FieldMismatch { field: field.to_owned(), expected: T::KIND })
    }

    /// Clones a value produced by a custom converter.
    pub fn get_custom<T: Any + Clone>(&self, field: &str) -> Result<T> {
        self.get(field)
            .and_then(Value::downcast_ref::<T>)
            .cloned()
            .ok_or_else(|| Error::FieldMismatch {
                field: field.to_owned(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.names.iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A type that can be bound from the rows of a document.
///
/// ```
/// use rowbind::{FromRecord, Record, RecordDescriptor, Result, TypeTag};
///
/// struct Point { x: i64, y: i64 }
///
/// impl FromRecord for Point {
///     fn descriptor() -> RecordDescriptor {
///         RecordDescriptor::new().field("x", TypeTag::Integer).field("y", TypeTag::Integer)
///     }
///
///     fn from_record(record: Record) -> Result<Self> {
///         Ok(Point { x: record.get_as("x")?, y: record.get_as("y")? })
///     }
/// }
///
/// let points: Vec<Point> = rowbind::parse_as("x,y\n1,2\n3,4", &rowbind::CSV).unwrap();
/// assert_eq!(points[1].y, 4);
/// ```
pub trait FromRecord: Sized {
    fn descriptor() -> RecordDescriptor;

    fn from_record(record: Record) -> Result<Self>;
}
