use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Longest accepted symbol, index prefix included. Covers every form
/// the built-in providers quote (`BRK.B`, `BTC-USD`, `^GSPTSE`).
const MAX_SYMBOL_LEN: usize = 12;

/// Normalized market symbol.
///
/// Accepts plain tickers (`IBM`, `BRK.B`), dash-joined pairs
/// (`BTC-USD`), and index symbols with a leading caret (`^GSPC`).
/// Input is trimmed and uppercased once at the boundary; the
/// normalized text is what keys the cache and lands in provider URLs,
/// so equal symbols always produce equal cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(Box<str>);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let ticker = normalized.strip_prefix('^').unwrap_or(&normalized);

        if ticker.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        if normalized.len() > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len: normalized.len(),
                max: MAX_SYMBOL_LEN,
            });
        }

        for (index, ch) in ticker.char_indices() {
            if index == 0 && !ch.is_ascii_alphabetic() {
                return Err(ValidationError::SymbolInvalidStart { ch });
            }
            if !(ch.is_ascii_alphanumeric() || ch == '.' || ch == '-') {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized.into_boxed_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this names a market index (`^GSPC` style) rather than a
    /// tradable instrument.
    pub fn is_index(&self) -> bool {
        self.0.starts_with('^')
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0.into_string()
    }
}
