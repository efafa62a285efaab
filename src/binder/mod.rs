use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::config::registry::{Converter, TypeTag};
use crate::error::{Error, Result};
use crate::record::{FieldSpec, FromRecord, Record, RecordDescriptor};
use crate::tokenizer::RowTokenizer;

/// One data row keyed by header column name, in header order.
pub type NamedRow = IndexMap<String, String>;

/// A tokenized document: the header plus every data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1-based line number in the source document.
    pub line: usize,
    pub columns: Vec<String>,
}

/// Binds whole documents to rows or records under one [`ParserConfig`].
///
/// ```
/// use rowbind::{RecordBinder, RecordDescriptor, TypeTag, Value, CSV};
///
/// let descriptor = RecordDescriptor::new()
///     .field("a", TypeTag::String)
///     .field("b", TypeTag::Integer);
/// let records = RecordBinder::new(&CSV).parse_records("a,b\nhello,123", &descriptor).unwrap();
/// assert_eq!(records[0].get("b"), Some(&Value::Integer(123)));
/// ```
pub struct RecordBinder<'cfg> {
    config: &'cfg ParserConfig,
    tokenizer: RowTokenizer,
}

struct BoundField<'d> {
    spec: &'d FieldSpec,
    index: usize,
    converter: Converter,
}

/// Header validated against a descriptor; converts rows independently.
struct BindPlan<'d> {
    names: Arc<[String]>,
    fields: Vec<BoundField<'d>>,
    width: usize,
}

impl<'cfg> RecordBinder<'cfg> {
    pub fn new(config: &'cfg ParserConfig) -> Self {
        Self {
            config,
            tokenizer: RowTokenizer::from_config(config),
        }
    }

    pub fn config(&self) -> &'cfg ParserConfig {
        self.config
    }

    pub fn tokenize(&self, text: &str) -> Result<Table> {
        let mut lines = lines(text).filter(|(_, line)| !self.tokenizer.trim(line).is_empty());

        let (header_line, header_text) = lines.next().ok_or(Error::MissingHeader)?;
        let header = self.split(header_line, header_text)?;

        let mut seen = HashSet::with_capacity(header.len());
        if let Some(column) = header.iter().find(|column| !seen.insert(column.as_str())) {
            return Err(Error::DuplicateColumn { column: column.clone() });
        }

        let mut rows = Vec::new();
        for (line, row_text) in lines {
            let columns = self.split(line, row_text)?;
            if !self.config.flexible() && columns.len() != header.len() {
                return Err(Error::ColumnCountMismatch {
                    line,
                    expected: header.len(),
                    found: columns.len(),
                });
            }
            rows.push(TableRow { line, columns });
        }

        debug!(columns = header.len(), rows = rows.len(), "tokenized document");
        Ok(Table { header, rows })
    }

    pub fn parse_rows(&self, text: &str) -> Result<Vec<NamedRow>> {
        let table = self.tokenize(text)?;
        Ok(table
            .rows
            .into_iter()
            .map(|row| table.header.iter().cloned().zip(row.columns).collect())
            .collect())
    }

    pub fn parse_records(&self, text: &str, descriptor: &RecordDescriptor) -> Result<Vec<Record>> {
        let table = self.tokenize(text)?;
        let plan = self.plan(&table.header, descriptor)?;
        table.rows.iter().map(|row| plan.bind(row)).collect()
    }

    /// Like [`parse_records`](Self::parse_records), converting rows on the
    /// rayon pool. Records come back in document order; if several rows fail,
    /// any one of their errors is returned.
    pub fn parse_records_par(
        &self,
        text: &str,
        descriptor: &RecordDescriptor,
    ) -> Result<Vec<Record>> {
        let table = self.tokenize(text)?;
        let plan = self.plan(&table.header, descriptor)?;
        table.rows.par_iter().map(|row| plan.bind(row)).collect()
    }

    pub fn parse_as<T: FromRecord>(&self, text: &str) -> Result<Vec<T>> {
        let descriptor = T::descriptor();
        self.parse_records(text, &descriptor)?
            .into_iter()
            .map(T::from_record)
            .collect()
    }

    pub fn parse_as_par<T: FromRecord + Send>(&self, text: &str) -> Result<Vec<T>> {
        let descriptor = T::descriptor();
        let table = self.tokenize(text)?;
        let plan = self.plan(&table.header, &descriptor)?;
        table
            .rows
            .par_iter()
            .map(|row| plan.bind(row).and_then(T::from_record))
            .collect()
    }

    fn split(&self, line: usize, text: &str) -> Result<Vec<String>> {
        self.tokenizer.split_row(text).map_err(|err| err.at_line(line))
    }

    fn plan<'d>(
        &self,
        header: &[String],
        descriptor: &'d RecordDescriptor,
    ) -> Result<BindPlan<'d>> {
        let converters = self.config.converters();

        let unhandled: Vec<(String, TypeTag)> = descriptor
            .fields()
            .iter()
            .filter(|field| !converters.contains(&field.tag))
            .map(|field| (field.name.clone(), field.tag.clone()))
            .collect();
        if !unhandled.is_empty() {
            return Err(Error::UnhandledType { fields: unhandled });
        }

        // a count mismatch fails even when every header name is referenced
        if !self.config.ignore_unknown_columns() && header.len() != descriptor.len() {
            let columns = header
                .iter()
                .filter(|column| !descriptor.fields().iter().any(|field| field.references(column)))
                .cloned()
                .collect();
            return Err(Error::UnknownColumns { columns });
        }

        let mut fields = Vec::with_capacity(descriptor.len());
        for spec in descriptor.fields() {
            let column = spec.source_column();
            let index = header
                .iter()
                .position(|name| name == column)
                .ok_or_else(|| Error::UnknownSourceColumn {
                    field: spec.name.clone(),
                    column: column.to_owned(),
                })?;
            let converter = converters.get(&spec.tag).ok_or_else(|| Error::UnhandledType {
                fields: vec![(spec.name.clone(), spec.tag.clone())],
            })?;
            fields.push(BoundField { spec, index, converter });
        }

        debug!(fields = fields.len(), header = header.len(), "validated descriptor against header");
        Ok(BindPlan {
            names: descriptor.fields().iter().map(|field| field.name.clone()).collect(),
            fields,
            width: header.len(),
        })
    }
}

impl BindPlan<'_> {
    fn bind(&self, row: &TableRow) -> Result<Record> {
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            // only reachable in flexible mode
            let raw = row.columns.get(field.index).ok_or(Error::ColumnCountMismatch {
                line: row.line,
                expected: self.width,
                found: row.columns.len(),
            })?;
            let value = (field.converter)(raw).map_err(|source| Error::Conversion {
                line: row.line,
                field: field.spec.name.clone(),
                column: field.spec.source_column().to_owned(),
                value: raw.clone(),
                tag: field.spec.tag.clone(),
                source,
            })?;
            values.push(value);
        }
        trace!(line = row.line, "bound record");
        Ok(Record::new(Arc::clone(&self.names), values))
    }
}

/// Splits on `\n` and strips a trailing `\r`, numbering lines from 1.
fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut start = 0;
    memchr::memchr_iter(b'\n', text.as_bytes())
        .chain(std::iter::once(text.len()))
        .enumerate()
        .map(move |(index, end)| {
            let line = &text[start..end];
            start = end + 1;
            (index + 1, line.strip_suffix('\r').unwrap_or(line))
        })
}
