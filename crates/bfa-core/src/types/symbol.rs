/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_LEN: usize = 20;

/// A validated contract identifier, e.g. `BTCUSDT` or `1000SHIBUSDT`.
///
/// Identifiers are constrained ASCII, not opaque bytes: uppercase
/// alphanumeric, at most 20 characters, ending in the quote-asset token with a
/// non-empty base. The store dictionary-encodes the column, so keys stay
/// byte-comparable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.len() > MAX_LEN
      || !trimmed.ends_with(crate::QUOTE_ASSET)
      || trimmed.len() <= crate::QUOTE_ASSET.len()
    {
      return Err(Error::InvalidSymbol(raw.to_string()));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
      return Err(Error::InvalidSymbol(raw.to_string()));
    }
    Ok(Symbol(trimmed.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Symbol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for Symbol {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Symbol::parse(s)
  }
}

impl TryFrom<String> for Symbol {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> {
    Symbol::parse(&value)
  }
}

impl From<Symbol> for String {
  fn from(symbol: Symbol) -> String {
    symbol.0
  }
}

impl AsRef<str> for Symbol {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_accepts_plain_symbol() {
    let symbol = Symbol::parse("BTCUSDT").unwrap();
    assert_eq!(symbol.as_str(), "BTCUSDT");
  }

  #[test]
  fn test_parse_accepts_numeric_prefix() {
    let symbol = Symbol::parse("1000SHIBUSDT").unwrap();
    assert_eq!(symbol.as_str(), "1000SHIBUSDT");
  }

  #[test]
  fn test_parse_trims_whitespace() {
    let symbol = Symbol::parse(" ETHUSDT\n").unwrap();
    assert_eq!(symbol.as_str(), "ETHUSDT");
  }

  #[test]
  fn test_parse_rejects_lowercase() {
    assert!(Symbol::parse("btcusdt").is_err());
  }

  #[test]
  fn test_parse_rejects_wrong_quote_asset() {
    assert!(Symbol::parse("BTCBUSD").is_err());
    assert!(Symbol::parse("BTCUSD").is_err());
  }

  #[test]
  fn test_parse_rejects_bare_quote_token() {
    assert!(Symbol::parse("USDT").is_err());
  }

  #[test]
  fn test_parse_rejects_overlong() {
    assert!(Symbol::parse("ABCDEFGHIJKLMNOPQUSDT").is_err());
  }

  #[test]
  fn test_parse_rejects_non_ascii() {
    assert!(Symbol::parse("ΒΤCUSDT").is_err());
  }

  #[test]
  fn test_ordering_is_lexicographic() {
    let a = Symbol::parse("ADAUSDT").unwrap();
    let b = Symbol::parse("BTCUSDT").unwrap();
    assert!(a < b);
  }

  #[test]
  fn test_serde_round_trip() {
    let symbol = Symbol::parse("BTCUSDT").unwrap();
    let json = serde_json::to_string(&symbol).unwrap();
    assert_eq!(json, "\"BTCUSDT\"");
    let back: Symbol = serde_json::from_str(&json).unwrap();
    assert_eq!(back, symbol);
  }

  #[test]
  fn test_serde_rejects_invalid() {
    let result: std::result::Result<Symbol, _> = serde_json::from_str("\"nope\"");
    assert!(result.is_err());
  }
}
