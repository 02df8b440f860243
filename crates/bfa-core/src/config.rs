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
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main configuration for a pipeline invocation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Path of the single-file columnar store.
  pub db_path: PathBuf,

  /// Path of the symbol catalog manifest (one identifier per line, sorted).
  pub symbols_path: PathBuf,

  /// Path of the canonical schema descriptor manifest.
  pub schema_path: PathBuf,

  /// Output path of the rankings artifact.
  pub rankings_path: PathBuf,

  /// Worker-pool size for the batch prober.
  pub workers: usize,

  /// Rolling lookback window in days for daily runs.
  pub lookback_days: u32,

  /// Base URL for archive HEAD probes and GETs.
  pub archive_base_url: String,

  /// Base URL for the bucket listing protocol.
  pub listing_base_url: String,

  /// Metadata endpoint URL for live contract discovery.
  pub exchange_info_url: String,

  /// Total deadline for one HEAD probe, in seconds.
  pub head_timeout_secs: u64,

  /// Total deadline for one archive GET, in seconds.
  pub archive_timeout_secs: u64,

  /// Backfill ranges wider than this use bulk listings instead of probes.
  pub bulk_listing_threshold_days: u32,

  /// Expected per-date symbol count band for the completeness check.
  pub completeness_min: u64,
  pub completeness_max: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
  match env::var(key) {
    Ok(raw) => raw.parse().map_err(|_| Error::Config(format!("Invalid {key}: '{raw}'"))),
    Err(_) => Ok(default),
  }
}

fn env_path(key: &str, default: &str) -> PathBuf {
  env::var(key).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

impl Config {
  /// Load configuration from environment variables, falling back to defaults.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let workers = env_parse("BFA_WORKERS", crate::DEFAULT_WORKERS)?;
    if workers == 0 {
      return Err(Error::Config("BFA_WORKERS must be at least 1".to_string()));
    }

    let completeness_min = env_parse("BFA_COMPLETENESS_MIN", crate::DEFAULT_COMPLETENESS_MIN)?;
    let completeness_max = env_parse("BFA_COMPLETENESS_MAX", crate::DEFAULT_COMPLETENESS_MAX)?;
    if completeness_min > completeness_max {
      return Err(Error::Config(format!(
        "completeness band inverted: {completeness_min} > {completeness_max}"
      )));
    }

    Ok(Config {
      db_path: env_path("BFA_DB_PATH", "data/futures_availability.duckdb"),
      symbols_path: env_path("BFA_SYMBOLS_PATH", "data/symbols.txt"),
      schema_path: env_path("BFA_SCHEMA_PATH", "data/schema_descriptor.json"),
      rankings_path: env_path("BFA_RANKINGS_PATH", "data/rankings.parquet"),
      workers,
      lookback_days: env_parse("BFA_LOOKBACK_DAYS", crate::DEFAULT_LOOKBACK_DAYS)?,
      archive_base_url: env::var("BFA_ARCHIVE_BASE_URL")
        .unwrap_or_else(|_| crate::ARCHIVE_BASE_URL.to_string()),
      listing_base_url: env::var("BFA_LISTING_BASE_URL")
        .unwrap_or_else(|_| crate::LISTING_BASE_URL.to_string()),
      exchange_info_url: env::var("BFA_EXCHANGE_INFO_URL")
        .unwrap_or_else(|_| crate::EXCHANGE_INFO_URL.to_string()),
      head_timeout_secs: env_parse("BFA_HEAD_TIMEOUT_SECS", crate::DEFAULT_HEAD_TIMEOUT_SECS)?,
      archive_timeout_secs: env_parse(
        "BFA_ARCHIVE_TIMEOUT_SECS",
        crate::DEFAULT_ARCHIVE_TIMEOUT_SECS,
      )?,
      bulk_listing_threshold_days: env_parse(
        "BFA_BULK_LISTING_THRESHOLD_DAYS",
        crate::DEFAULT_BULK_LISTING_THRESHOLD_DAYS,
      )?,
      completeness_min,
      completeness_max,
    })
  }

  /// Create a config with default values rooted at the given directory
  /// (for testing).
  pub fn default_with_root(root: &std::path::Path) -> Self {
    Config {
      db_path: root.join("futures_availability.duckdb"),
      symbols_path: root.join("symbols.txt"),
      schema_path: root.join("schema_descriptor.json"),
      rankings_path: root.join("rankings.parquet"),
      workers: crate::DEFAULT_WORKERS,
      lookback_days: crate::DEFAULT_LOOKBACK_DAYS,
      archive_base_url: crate::ARCHIVE_BASE_URL.to_string(),
      listing_base_url: crate::LISTING_BASE_URL.to_string(),
      exchange_info_url: crate::EXCHANGE_INFO_URL.to_string(),
      head_timeout_secs: crate::DEFAULT_HEAD_TIMEOUT_SECS,
      archive_timeout_secs: crate::DEFAULT_ARCHIVE_TIMEOUT_SECS,
      bulk_listing_threshold_days: crate::DEFAULT_BULK_LISTING_THRESHOLD_DAYS,
      completeness_min: crate::DEFAULT_COMPLETENESS_MIN,
      completeness_max: crate::DEFAULT_COMPLETENESS_MAX,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_with_root() {
    let config = Config::default_with_root(std::path::Path::new("/tmp/bfa"));
    assert_eq!(config.db_path, PathBuf::from("/tmp/bfa/futures_availability.duckdb"));
    assert_eq!(config.workers, crate::DEFAULT_WORKERS);
    assert_eq!(config.lookback_days, crate::DEFAULT_LOOKBACK_DAYS);
    assert_eq!(config.archive_base_url, crate::ARCHIVE_BASE_URL);
  }

  #[test]
  fn test_env_parse_default_used_when_unset() {
    env::remove_var("BFA_TEST_UNSET_KEY");
    let value: usize = env_parse("BFA_TEST_UNSET_KEY", 7).unwrap();
    assert_eq!(value, 7);
  }

  #[test]
  fn test_env_parse_rejects_garbage() {
    env::set_var("BFA_TEST_GARBAGE_KEY", "not-a-number");
    let result: Result<usize> = env_parse("BFA_TEST_GARBAGE_KEY", 7);
    assert!(result.is_err());
    env::remove_var("BFA_TEST_GARBAGE_KEY");
  }
}
