use crate::config::registry::{ConvertError, TypeTag};

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a parse or bind call can fail with.
///
/// Every failure aborts the whole call; none of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing header: the document has no non-blank lines")]
    MissingHeader,

    #[error("line {line}: unterminated quote {quote:?} opened at offset {offset}")]
    UnterminatedQuote { line: usize, offset: usize, quote: char },

    #[error(
        "line {line}: expected one of {} at offset {offset}, found {found:?}",
        quoted_chars(.expected)
    )]
    TrailingGarbage { line: usize, offset: usize, found: char, expected: Vec<char> },

    #[error("line {line}: expected a column at offset {offset}, found end of row")]
    EmptyInput { line: usize, offset: usize },

    #[error("index {index} out of bounds for span of length {len}")]
    Index { index: usize, len: usize },

    #[error("duplicate column '{column}' in header")]
    DuplicateColumn { column: String },

    #[error("line {line}: expected {expected} column(s) to match the header, found {found}")]
    ColumnCountMismatch { line: usize, expected: usize, found: usize },

    #[error(
        "no type converters registered for the following field(s): {}",
        unhandled_fields(.fields)
    )]
    UnhandledType { fields: Vec<(String, TypeTag)> },

    #[error("{}", unknown_columns(.columns))]
    UnknownColumns { columns: Vec<String> },

    #[error("field '{field}' reads column '{column}', which is not in the header")]
    UnknownSourceColumn { field: String, column: String },

    #[error(
        "line {line}: cannot convert {value:?} in column '{column}' to {tag} for field '{field}': {source}"
    )]
    Conversion {
        line: usize,
        field: String,
        column: String,
        value: String,
        tag: TypeTag,
        #[source]
        source: ConvertError,
    },

    #[error("field '{field}' is missing or is not a {expected}")]
    FieldMismatch { field: String, expected: &'static str },

    #[error("invalid parser configuration: {0}")]
    InvalidConfig(String),
}

pub(crate) fn quoted_chars(chars: &[char]) -> String {
    chars.iter().map(|c| format!("{c:?}")).collect::<Vec<_>>().join(", ")
}

fn unknown_columns(columns: &[String]) -> String {
    if columns.is_empty() {
        return "the header's column count does not match the target type's field count".to_owned();
    }
    let names = columns.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", ");
    format!("the following column(s) do not map to any field in the target type: {names}")
}

fn unhandled_fields(fields: &[(String, TypeTag)]) -> String {
    fields
        .iter()
        .map(|(field, tag)| format!("'{field}' ({tag})"))
        .collect::<Vec<_>>()
        .join(", ")
}
