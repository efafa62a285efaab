use crate::config::ParserConfig;
use crate::error::Error;
use crate::span::TextSpan;

/// Grammar violations found while splitting a single row.
///
/// Offsets are byte offsets into the row as it was handed to
/// [`RowTokenizer::split_row`]. The binder lifts these into [`Error`] once the
/// line number is known.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("unterminated quote {quote:?} opened at offset {offset}")]
    UnterminatedQuote { quote: char, offset: usize },
    #[error(
        "expected one of {} at offset {offset}, found {found:?}",
        crate::error::quoted_chars(.expected)
    )]
    TrailingGarbage { found: char, offset: usize, expected: Vec<char> },
    #[error("expected a column at offset {offset}, found end of row")]
    EmptyInput { offset: usize },
    #[error("index {index} out of bounds for span of length {len}")]
    Index { index: usize, len: usize },
}

impl RowError {
    pub fn at_line(self, line: usize) -> Error {
        match self {
            RowError::UnterminatedQuote { quote, offset } => {
                Error::UnterminatedQuote { line, offset, quote }
            }
            RowError::TrailingGarbage { found, offset, expected } => {
                Error::TrailingGarbage { line, offset, found, expected }
            }
            RowError::EmptyInput { offset } => Error::EmptyInput { line, offset },
            RowError::Index { index, len } => Error::Index { index, len },
        }
    }
}

/// Splits one line of delimited text into its columns.
#[derive(Debug, Clone)]
pub struct RowTokenizer {
    separators: Vec<char>,
    quotes: Vec<char>,
    escape: Option<char>,
    whitespace: Vec<char>,
}

struct Column<'src> {
    value: String,
    rest: TextSpan<'src>,
}

impl RowTokenizer {
    pub fn new(separators: &[char], quotes: &[char], escape: Option<char>) -> Self {
        // a char that delimits something is never trimmed as whitespace
        let whitespace = [' ', '\t']
            .into_iter()
            .filter(|c| !separators.contains(c) && !quotes.contains(c) && escape != Some(*c))
            .collect();
        Self {
            separators: separators.to_vec(),
            quotes: quotes.to_vec(),
            escape,
            whitespace,
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.separators(), config.quotes(), config.escape())
    }

    pub fn is_whitespace(&self, c: char) -> bool {
        self.whitespace.contains(&c)
    }

    pub fn trim<'src>(&self, row: &'src str) -> &'src str {
        row.trim_matches(|c| self.is_whitespace(c))
    }

    pub fn split_row(&self, row: &str) -> Result<Vec<String>, RowError> {
        let leading = row.len() - row.trim_start_matches(|c| self.is_whitespace(c)).len();
        let trailing = row.trim_end_matches(|c| self.is_whitespace(c)).len().max(leading);
        let mut rest = TextSpan::from(row).slice_to(leading, trailing);

        if rest.is_empty() {
            return Ok(vec![String::new()]);
        }

        let mut columns = Vec::new();
        loop {
            let column = self.column(self.skip_whitespace(rest))?;
            columns.push(column.value);

            let after = self.skip_whitespace(column.rest);
            match after.head_char() {
                None => break,
                Some(c) if self.separators.contains(&c) => {
                    rest = after.tail();
                    if self.skip_whitespace(rest).is_empty() {
                        // trailing separator closes one last, empty column
                        columns.push(String::new());
                        break;
                    }
                }
                Some(found) => {
                    return Err(RowError::TrailingGarbage {
                        found,
                        offset: after.start(),
                        expected: self.separators.clone(),
                    });
                }
            }
        }
        Ok(columns)
    }

    fn column<'src>(&self, span: TextSpan<'src>) -> Result<Column<'src>, RowError> {
        match span.head_char() {
            None => Err(RowError::EmptyInput { offset: span.start() }),
            Some(q) if self.quotes.contains(&q) => self.quoted_column(q, span),
            Some(c) if self.separators.contains(&c) => {
                Ok(Column { value: String::new(), rest: span })
            }
            Some(_) => {
                let mut column = self.take_until(&self.separators, span);
                let kept = column.value.trim_end_matches(|c| self.is_whitespace(c)).len();
                column.value.truncate(kept);
                Ok(column)
            }
        }
    }

    fn quoted_column<'src>(
        &self,
        quote: char,
        span: TextSpan<'src>,
    ) -> Result<Column<'src>, RowError> {
        let column = self.take_until(&[quote], span.tail());
        match column.rest.head_char() {
            Some(c) if c == quote => Ok(Column {
                value: column.value,
                rest: column.rest.tail(),
            }),
            _ => Err(RowError::UnterminatedQuote { quote, offset: span.start() }),
        }
    }

    fn skip_whitespace<'src>(&self, span: TextSpan<'src>) -> TextSpan<'src> {
        match span.char_indices().find(|&(_, c)| !self.is_whitespace(c)) {
            Some((i, _)) => span.slice(i),
            None => span.slice(span.len()),
        }
    }

    /// Consumes chars up to the first unescaped delimiter. The returned rest
    /// starts at that delimiter, or is empty if the span ran out first.
    fn take_until<'src>(&self, delimiters: &[char], span: TextSpan<'src>) -> Column<'src> {
        let mut value = String::with_capacity(span.len());
        let mut chars = span.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if delimiters.contains(&c) {
                return Column { value, rest: span.slice(i) };
            }
            if Some(c) == self.escape {
                if let Some(&(_, next)) = chars.peek() {
                    if delimiters.contains(&next) || Some(next) == self.escape {
                        value.push(next);
                        chars.next();
                        continue;
                    }
                }
            }
            value.push(c);
        }

        Column { value, rest: span.slice(span.len()) }
    }
}
