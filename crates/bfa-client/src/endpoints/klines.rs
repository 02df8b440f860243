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

//! Daily kline archive reader: one zip, one CSV, one row, eleven numbers.
//!
//! Upstream field order is fixed: `open_time, open, high, low, close, volume,
//! close_time, quote_volume, count, taker_buy_volume, taker_buy_quote_volume,
//! ignore`. Newer archives prepend a header row; it is skipped. Anything else
//! unexpected is a parse error, never a silent default.

use crate::client::HttpClient;
use crate::endpoints::probe::archive_url;
use bfa_core::{Error, Result, Symbol};
use chrono::NaiveDate;
use csv::StringRecord;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const KLINE_FIELD_COUNT: usize = 12;

/// The trading aggregates parsed from one daily kline row.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyKlines {
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

impl HttpClient {
  /// Fetch and parse the daily (1d interval) kline archive for one cell.
  ///
  /// A 404 is not an error: the archive simply is not published (yet) and the
  /// caller keeps the cell's aggregates null.
  pub async fn fetch_daily_klines(
    &self,
    symbol: &Symbol,
    date: NaiveDate,
  ) -> Result<Option<DailyKlines>> {
    let url = archive_url(&self.archive_base_url, symbol, date, "1d");

    let response = self
      .http()
      .get(&url)
      .timeout(self.archive_timeout)
      .send()
      .await
      .map_err(|e| HttpClient::transport_error(&url, e))?;

    let status = response.status().as_u16();
    if status == 404 {
      debug!(symbol = %symbol, %date, "daily kline archive not published");
      return Ok(None);
    }
    if status != 200 {
      return Err(Error::UnexpectedStatus { url, status });
    }

    let bytes = response
      .bytes()
      .await
      .map_err(|e| Error::Network { url: url.clone(), message: e.to_string() })?;

    parse_archive(bytes.as_ref(), symbol, date, &url).map(Some)
  }
}

fn parse_archive(bytes: &[u8], symbol: &Symbol, date: NaiveDate, url: &str) -> Result<DailyKlines> {
  let mut zip = ZipArchive::new(Cursor::new(bytes))
    .map_err(|e| Error::Archive { url: url.to_string(), message: e.to_string() })?;

  let mut csv_buf = None;
  for idx in 0..zip.len() {
    let mut entry = zip
      .by_index(idx)
      .map_err(|e| Error::Archive { url: url.to_string(), message: e.to_string() })?;
    if entry.is_dir() || !entry.name().to_ascii_lowercase().ends_with(".csv") {
      continue;
    }
    let mut buf = Vec::new();
    entry
      .read_to_end(&mut buf)
      .map_err(|e| Error::Archive { url: url.to_string(), message: e.to_string() })?;
    csv_buf = Some(buf);
    break;
  }

  let csv_buf = csv_buf.ok_or_else(|| Error::Archive {
    url: url.to_string(),
    message: "archive has no CSV entry".to_string(),
  })?;

  parse_csv(&csv_buf, symbol, date, url)
}

fn parse_csv(buf: &[u8], symbol: &Symbol, date: NaiveDate, url: &str) -> Result<DailyKlines> {
  let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(Cursor::new(buf));

  let mut parsed = None;
  for record in reader.records() {
    let record = record
      .map_err(|e| Error::Archive { url: url.to_string(), message: e.to_string() })?;
    if is_header_row(&record) {
      continue;
    }
    if parsed.is_some() {
      return Err(Error::Archive {
        url: url.to_string(),
        message: "daily archive has more than one kline row".to_string(),
      });
    }
    parsed = Some(parse_kline_record(&record, symbol, date)?);
  }

  parsed.ok_or_else(|| Error::Archive {
    url: url.to_string(),
    message: "daily archive has no kline row".to_string(),
  })
}

fn is_header_row(record: &StringRecord) -> bool {
  record.get(0).is_some_and(|first| first.eq_ignore_ascii_case("open_time"))
}

fn parse_kline_record(
  record: &StringRecord,
  symbol: &Symbol,
  date: NaiveDate,
) -> Result<DailyKlines> {
  if record.len() != KLINE_FIELD_COUNT {
    return Err(Error::KlineArity {
      symbol: symbol.to_string(),
      date,
      found: record.len(),
      expected: KLINE_FIELD_COUNT,
    });
  }

  Ok(DailyKlines {
    open_price: parse_f64(record, 1, "open", symbol, date)?,
    high_price: parse_f64(record, 2, "high", symbol, date)?,
    low_price: parse_f64(record, 3, "low", symbol, date)?,
    close_price: parse_f64(record, 4, "close", symbol, date)?,
    volume_base: parse_f64(record, 5, "volume", symbol, date)?,
    quote_volume_usdt: parse_f64(record, 7, "quote_volume", symbol, date)?,
    trade_count: parse_i64(record, 8, "count", symbol, date)?,
    taker_buy_volume_base: parse_f64(record, 9, "taker_buy_volume", symbol, date)?,
    taker_buy_quote_volume_usdt: parse_f64(record, 10, "taker_buy_quote_volume", symbol, date)?,
  })
}

fn parse_f64(
  record: &StringRecord,
  idx: usize,
  field: &'static str,
  symbol: &Symbol,
  date: NaiveDate,
) -> Result<f64> {
  let raw = record.get(idx).unwrap_or_default();
  raw.parse::<f64>().map_err(|_| Error::KlineParse {
    symbol: symbol.to_string(),
    date,
    field,
    value: raw.to_string(),
  })
}

fn parse_i64(
  record: &StringRecord,
  idx: usize,
  field: &'static str,
  symbol: &Symbol,
  date: NaiveDate,
) -> Result<i64> {
  let raw = record.get(idx).unwrap_or_default();
  raw.parse::<i64>().map_err(|_| Error::KlineParse {
    symbol: symbol.to_string(),
    date,
    field,
    value: raw.to_string(),
  })
}
