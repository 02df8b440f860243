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

use bfa_core::Symbol;
use chrono::{NaiveDate, NaiveDateTime};

/// One full row of `daily_availability`, keyed by `(date, symbol)`.
///
/// `file_size_bytes` and `last_modified` are populated iff the archive was
/// observed (status 200); the nine aggregate fields are populated only once
/// the daily kline archive has been parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRow {
  pub date: NaiveDate,
  pub symbol: Symbol,
  pub available: bool,
  pub file_size_bytes: Option<u64>,
  pub last_modified: Option<String>,
  pub url: String,
  pub status_code: u16,
  pub probe_timestamp: NaiveDateTime,
  pub quote_volume_usdt: Option<f64>,
  pub trade_count: Option<i64>,
  pub volume_base: Option<f64>,
  pub taker_buy_volume_base: Option<f64>,
  pub taker_buy_quote_volume_usdt: Option<f64>,
  pub open_price: Option<f64>,
  pub high_price: Option<f64>,
  pub low_price: Option<f64>,
  pub close_price: Option<f64>,
}

impl AvailabilityRow {
  /// A row for an observed archive (status 200), aggregates still null.
  pub fn observed(
    date: NaiveDate,
    symbol: Symbol,
    url: String,
    file_size_bytes: u64,
    last_modified: String,
    probe_timestamp: NaiveDateTime,
  ) -> Self {
    AvailabilityRow {
      date,
      symbol,
      available: true,
      file_size_bytes: Some(file_size_bytes),
      last_modified: Some(last_modified),
      url,
      status_code: 200,
      probe_timestamp,
      quote_volume_usdt: None,
      trade_count: None,
      volume_base: None,
      taker_buy_volume_base: None,
      taker_buy_quote_volume_usdt: None,
      open_price: None,
      high_price: None,
      low_price: None,
      close_price: None,
    }
  }

  /// A row for an absent archive (status 404).
  pub fn missing(
    date: NaiveDate,
    symbol: Symbol,
    url: String,
    probe_timestamp: NaiveDateTime,
  ) -> Self {
    AvailabilityRow {
      date,
      symbol,
      available: false,
      file_size_bytes: None,
      last_modified: None,
      url,
      status_code: 404,
      probe_timestamp,
      quote_volume_usdt: None,
      trade_count: None,
      volume_base: None,
      taker_buy_volume_base: None,
      taker_buy_quote_volume_usdt: None,
      open_price: None,
      high_price: None,
      low_price: None,
      close_price: None,
    }
  }
}

/// The nine aggregate fields parsed from one daily kline archive, merged into
/// an existing row without touching its probe-observation fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KlineAggregates {
  pub open_price: f64,
  pub high_price: f64,
  pub low_price: f64,
  pub close_price: f64,
  pub volume_base: f64,
  pub quote_volume_usdt: f64,
  pub trade_count: i64,
  pub taker_buy_volume_base: f64,
  pub taker_buy_quote_volume_usdt: f64,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).unwrap()
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn now() -> NaiveDateTime {
    date(2024, 6, 2).and_hms_opt(4, 0, 0).unwrap()
  }

  #[test]
  fn test_observed_row_upholds_availability_invariant() {
    let row = AvailabilityRow::observed(
      date(2024, 6, 1),
      symbol("BTCUSDT"),
      "https://x.zip".to_string(),
      57_000,
      "Sun, 02 Jun 2024 03:00:00 GMT".to_string(),
      now(),
    );
    assert!(row.available);
    assert_eq!(row.status_code, 200);
    assert_eq!(row.file_size_bytes, Some(57_000));
    assert!(row.quote_volume_usdt.is_none());
  }

  #[test]
  fn test_missing_row_upholds_availability_invariant() {
    let row = AvailabilityRow::missing(
      date(2024, 5, 31),
      symbol("ETHUSDT"),
      "https://x.zip".to_string(),
      now(),
    );
    assert!(!row.available);
    assert_eq!(row.status_code, 404);
    assert!(row.file_size_bytes.is_none());
    assert!(row.last_modified.is_none());
  }
}
