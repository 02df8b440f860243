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

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("Environment variable error: {0}")]
  EnvVar(#[from] std::env::VarError),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("Date parsing error: {0}")]
  ParseDate(#[from] chrono::ParseError),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Invalid symbol: {0}")]
  InvalidSymbol(String),

  #[error("Invalid date range: {start} > {end}")]
  InvalidDateRange { start: NaiveDate, end: NaiveDate },

  #[error("Date {date} precedes launch date {launch}")]
  BeforeLaunch { date: NaiveDate, launch: NaiveDate },

  #[error("Network error for {url}: {message}")]
  Network { url: String, message: String },

  #[error("Request timed out for {url}")]
  Timeout { url: String },

  #[error("Unexpected HTTP status {status} for {url}")]
  UnexpectedStatus { url: String, status: u16 },

  #[error("Metadata endpoint geo-blocked (451) at {url}")]
  GeoBlocked { url: String },

  #[error("Archive error for {url}: {message}")]
  Archive { url: String, message: String },

  #[error("Kline parse error for {symbol} on {date}: field {field} = '{value}'")]
  KlineParse { symbol: String, date: NaiveDate, field: &'static str, value: String },

  #[error("Kline row for {symbol} on {date} has {found} fields, expected {expected}")]
  KlineArity { symbol: String, date: NaiveDate, found: usize, expected: usize },

  #[error("Listing error for prefix {prefix}: {message}")]
  Listing { prefix: String, message: String },
}

impl Error {
  /// Transient errors are repaired by the next scheduled run's overlapping
  /// lookback; the distinction only affects reporting, never retry.
  pub fn is_transient(&self) -> bool {
    matches!(
      self,
      Error::Network { .. } | Error::Timeout { .. } | Error::UnexpectedStatus { status: 500..=599, .. }
    )
  }
}

pub type Result<T> = std::result::Result<T, Error>;
