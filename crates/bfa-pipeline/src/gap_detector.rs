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

//! Gap detector: catalog symbols the store has never seen. The common path
//! is an empty result and no work.

use bfa_core::Symbol;
use std::collections::BTreeSet;

/// Symbols requiring a historical backfill: everything the catalog knows
/// that the store has no row for, in order.
pub fn detect_gaps(catalog: &BTreeSet<Symbol>, seen_in_store: &BTreeSet<Symbol>) -> Vec<Symbol> {
  catalog.difference(seen_in_store).cloned().collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn set(names: &[&str]) -> BTreeSet<Symbol> {
    names.iter().map(|name| Symbol::parse(name).unwrap()).collect()
  }

  #[test]
  fn test_no_gaps_when_store_covers_catalog() {
    let gaps = detect_gaps(&set(&["BTCUSDT", "ETHUSDT"]), &set(&["BTCUSDT", "ETHUSDT"]));
    assert!(gaps.is_empty());
  }

  #[test]
  fn test_new_symbol_is_a_gap() {
    let gaps = detect_gaps(&set(&["BTCUSDT", "NEWUSDT"]), &set(&["BTCUSDT"]));
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].as_str(), "NEWUSDT");
  }

  #[test]
  fn test_store_only_symbols_are_not_gaps() {
    // Rows for symbols the catalog forgot are history, not work.
    let gaps = detect_gaps(&set(&["BTCUSDT"]), &set(&["BTCUSDT", "GHOSTUSDT"]));
    assert!(gaps.is_empty());
  }

  #[test]
  fn test_empty_store_gaps_everything_in_order() {
    let gaps = detect_gaps(&set(&["ETHUSDT", "BTCUSDT"]), &BTreeSet::new());
    let names: Vec<&str> = gaps.iter().map(|s| s.as_str()).collect();
    assert_eq!(names, vec!["BTCUSDT", "ETHUSDT"]);
  }
}
