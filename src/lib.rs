//! Delimited-text parsing with configurable separators, quotes and escaping,
//! and binding of the parsed rows to typed records.
//!
//! ```
//! use rowbind::{RecordDescriptor, TypeTag, Value, SSV};
//!
//! let rows = rowbind::parse_rows("name;qty\n'a;b'; 3", &SSV).unwrap();
//! assert_eq!(rows[0]["name"], "a;b");
//!
//! let descriptor = RecordDescriptor::new()
//!     .field("name", TypeTag::String)
//!     .field("qty", TypeTag::Integer);
//! let records = rowbind::parse_records("name;qty\n'a;b'; 3", &SSV, &descriptor).unwrap();
//! assert_eq!(records[0].get("qty"), Some(&Value::Integer(3)));
//! ```

pub mod binder;
pub mod config;
pub mod error;
pub mod record;
pub mod span;
pub mod tokenizer;

pub use binder::{NamedRow, RecordBinder, Table, TableRow};
pub use config::registry::{ConvertError, Converter, ConverterRegistry, TypeTag};
pub use config::{ConfigOverrides, ParserConfig, ParserConfigBuilder, ParserOptions, CSV, SSV, TSV};
pub use error::{Error, Result};
pub use record::{FieldSpec, FromRecord, FromValue, OffsetTime, Record, RecordDescriptor, Value};
pub use span::TextSpan;
pub use tokenizer::{RowError, RowTokenizer};

pub fn parse_rows(text: &str, config: &ParserConfig) -> Result<Vec<NamedRow>> {
    RecordBinder::new(config).parse_rows(text)
}

pub fn parse_records(
    text: &str,
    config: &ParserConfig,
    descriptor: &RecordDescriptor,
) -> Result<Vec<Record>> {
    RecordBinder::new(config).parse_records(text, descriptor)
}

pub fn parse_as<T: FromRecord>(text: &str, config: &ParserConfig) -> Result<Vec<T>> {
    RecordBinder::new(config).parse_as(text)
}
