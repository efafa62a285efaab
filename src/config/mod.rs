pub mod convert;
pub mod registry;

use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use registry::{Converter, ConverterRegistry, TypeTag};

pub const DEFAULT_SEPARATORS: &[char] = &[','];
pub const DEFAULT_QUOTES: &[char] = &['"', '\''];
pub const DEFAULT_ESCAPE: char = '\\';

/// Comma-separated values.
pub static CSV: ParserConfig = ParserConfig::preset(DEFAULT_SEPARATORS);
/// Semicolon-separated values.
pub static SSV: ParserConfig = ParserConfig::preset(&[';']);
/// Tab-separated values.
pub static TSV: ParserConfig = ParserConfig::preset(&['\t']);

/// Immutable parser settings.
///
/// Obtain one from a preset ([`CSV`], [`SSV`], [`TSV`]), from
/// [`ParserConfig::builder`], or from deserialized [`ParserOptions`]. Every
/// way of deriving a modified config returns a new value and leaves the
/// original untouched.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    separators: Cow<'static, [char]>,
    quotes: Cow<'static, [char]>,
    escape: Option<char>,
    ignore_unknown_columns: bool,
    flexible: bool,
    converters: ConverterRegistry,
}

impl ParserConfig {
    const fn preset(separators: &'static [char]) -> Self {
        Self {
            separators: Cow::Borrowed(separators),
            quotes: Cow::Borrowed(DEFAULT_QUOTES),
            escape: Some(DEFAULT_ESCAPE),
            ignore_unknown_columns: false,
            flexible: false,
            converters: ConverterRegistry::builtin(),
        }
    }

    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }

    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    pub fn quotes(&self) -> &[char] {
        &self.quotes
    }

    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    pub fn ignore_unknown_columns(&self) -> bool {
        self.ignore_unknown_columns
    }

    /// Whether data rows may have a different column count than the header.
    pub fn flexible(&self) -> bool {
        self.flexible
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Thaws this config into a builder holding a copy of every setting.
    pub fn to_builder(&self) -> ParserConfigBuilder {
        ParserConfigBuilder {
            separators: self.separators.to_vec(),
            quotes: self.quotes.to_vec(),
            escape: self.escape,
            ignore_unknown_columns: self.ignore_unknown_columns,
            flexible: self.flexible,
            converters: self.converters.clone(),
        }
    }

    pub fn with_overrides(&self, overrides: ConfigOverrides) -> Result<ParserConfig> {
        let mut builder = self.to_builder();
        if let Some(separators) = overrides.separators {
            builder = builder.separators(separators);
        }
        if let Some(quotes) = overrides.quotes {
            builder = builder.quotes(quotes);
        }
        if let Some(escape) = overrides.escape {
            builder = builder.escape(escape);
        }
        if let Some(ignore) = overrides.ignore_unknown_columns {
            builder = builder.ignore_unknown_columns(ignore);
        }
        if let Some(flexible) = overrides.flexible {
            builder = builder.flexible(flexible);
        }
        if let Some(converters) = overrides.converters {
            builder = builder.converters(converters);
        }
        builder.build()
    }

    /// Returns a copy of this config with one more converter registered.
    pub fn register(&self, tag: TypeTag, converter: Converter) -> ParserConfig {
        ParserConfig {
            converters: self.converters.register(tag, converter),
            ..self.clone()
        }
    }

    pub fn options(&self) -> ParserOptions {
        ParserOptions {
            separators: self.separators.to_vec(),
            quotes: self.quotes.to_vec(),
            escape: self.escape,
            ignore_unknown_columns: self.ignore_unknown_columns,
            flexible: self.flexible,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        CSV.clone()
    }
}

/// Mutable staging area for a [`ParserConfig`].
#[derive(Debug, Clone)]
pub struct ParserConfigBuilder {
    separators: Vec<char>,
    quotes: Vec<char>,
    escape: Option<char>,
    ignore_unknown_columns: bool,
    flexible: bool,
    converters: ConverterRegistry,
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        CSV.to_builder()
    }
}

impl ParserConfigBuilder {
    pub fn separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separators = separators.into_iter().collect();
        self
    }

    pub fn separator(self, separator: char) -> Self {
        self.separators([separator])
    }

    pub fn quotes(mut self, quotes: impl IntoIterator<Item = char>) -> Self {
        self.quotes = quotes.into_iter().collect();
        self
    }

    pub fn escape(mut self, escape: Option<char>) -> Self {
        self.escape = escape;
        self
    }

    pub fn ignore_unknown_columns(mut self, ignore: bool) -> Self {
        self.ignore_unknown_columns = ignore;
        self
    }

    pub fn flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }

    pub fn converters(mut self, converters: ConverterRegistry) -> Self {
        self.converters = converters;
        self
    }

    pub fn register(mut self, tag: TypeTag, converter: Converter) -> Self {
        self.converters = self.converters.register(tag, converter);
        self
    }

    pub fn build(mut self) -> Result<ParserConfig> {
        dedup_in_order(&mut self.separators);
        dedup_in_order(&mut self.quotes);

        if self.separators.is_empty() {
            return Err(Error::InvalidConfig("at least one separator is required".into()));
        }
        if let Some(c) = self.separators.iter().find(|c| self.quotes.contains(*c)) {
            return Err(Error::InvalidConfig(format!(
                "{c:?} is configured as both separator and quote"
            )));
        }
        if let Some(escape) = self.escape {
            if self.separators.contains(&escape) || self.quotes.contains(&escape) {
                return Err(Error::InvalidConfig(format!(
                    "escape {escape:?} is also configured as a separator or quote"
                )));
            }
        }

        Ok(ParserConfig {
            separators: Cow::Owned(self.separators),
            quotes: Cow::Owned(self.quotes),
            escape: self.escape,
            ignore_unknown_columns: self.ignore_unknown_columns,
            flexible: self.flexible,
            converters: self.converters,
        })
    }
}

/// Field-by-field replacements applied by [`ParserConfig::with_overrides`].
/// `None` keeps the base config's value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub separators: Option<Vec<char>>,
    pub quotes: Option<Vec<char>>,
    pub escape: Option<Option<char>>,
    pub ignore_unknown_columns: Option<bool>,
    pub flexible: Option<bool>,
    pub converters: Option<ConverterRegistry>,
}

/// Serializable form of the scalar settings of a [`ParserConfig`].
///
/// Missing keys take the [`CSV`] defaults; converters always start from the
/// built-in registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOptions {
    pub separators: Vec<char>,
    pub quotes: Vec<char>,
    pub escape: Option<char>,
    pub ignore_unknown_columns: bool,
    pub flexible: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        CSV.options()
    }
}

impl ParserOptions {
    pub fn into_config(self) -> Result<ParserConfig> {
        ParserConfig::builder()
            .separators(self.separators)
            .quotes(self.quotes)
            .escape(self.escape)
            .ignore_unknown_columns(self.ignore_unknown_columns)
            .flexible(self.flexible)
            .build()
    }
}

/// Drops repeated chars, keeping the first occurrence of each.
fn dedup_in_order(chars: &mut Vec<char>) {
    let mut seen = HashSet::with_capacity(chars.len());
    chars.retain(|c| seen.insert(*c));
}
