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

//! # bfa-core
//!
//! Core types, configuration, and error handling for the futures archive
//! availability pipeline.
//!
//! This crate provides the foundational components shared across all pipeline
//! crates:
//!
//! - [`Config`] - pipeline configuration (paths, worker count, lookback)
//! - [`Error`] and [`Result`] - unified error handling
//! - [`Symbol`] - validated contract identifier
//! - [`DateRange`] - inclusive, pre-flight-validated date ranges

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::date_range::DateRange;
pub use types::symbol::Symbol;

use chrono::NaiveDate;

/// Base URL for the public archive bucket (HEAD probes and archive GETs).
pub const ARCHIVE_BASE_URL: &str = "https://data.binance.vision";

/// Base URL for the bucket's object-listing protocol (prefix enumeration).
pub const LISTING_BASE_URL: &str = "https://s3-ap-northeast-1.amazonaws.com/data.binance.vision";

/// Metadata endpoint listing currently tradable contracts.
pub const EXCHANGE_INFO_URL: &str = "https://fapi.binance.com/fapi/v1/exchangeInfo";

/// Quote asset every tracked contract settles in.
pub const QUOTE_ASSET: &str = "USDT";

/// Worker-pool size for the batch prober. Empirical latency/variance optimum
/// against this bucket; tunable via `BFA_WORKERS`.
pub const DEFAULT_WORKERS: usize = 150;

/// Rolling lookback window in days for daily runs.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 20;

/// Total deadline for a single HEAD probe, in seconds.
pub const DEFAULT_HEAD_TIMEOUT_SECS: u64 = 10;

/// Total deadline for a single archive GET, in seconds.
pub const DEFAULT_ARCHIVE_TIMEOUT_SECS: u64 = 60;

/// Backfill ranges wider than this many days use prefix listings instead of
/// point probes.
pub const DEFAULT_BULK_LISTING_THRESHOLD_DAYS: u32 = 13;

/// Expected per-date symbol count band for the completeness check.
pub const DEFAULT_COMPLETENESS_MIN: u64 = 100;
pub const DEFAULT_COMPLETENESS_MAX: u64 = 700;

/// Minimum live-set match ratio for the cross-check validator.
pub const CROSS_CHECK_MIN_RATIO: f64 = 0.95;

/// First day USDT-margined perpetual archives exist on the bucket.
pub fn futures_launch_date() -> NaiveDate {
  NaiveDate::from_ymd_opt(2019, 9, 8).expect("launch date is a valid calendar date")
}
