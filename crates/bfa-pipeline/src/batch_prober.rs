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

//! Batch prober: one date x many symbols over a fixed worker pool.
//!
//! No ordering is promised within a batch; the result is a map, not a
//! sequence. Every log record under a batch carries its correlation tag so
//! per-symbol failures can be grouped into network-wide incidents afterwards.

use crate::error::{PipelineError, PipelineResult};
use bfa_client::{HttpClient, ProbeRecord};
use bfa_core::Symbol;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Completed probes required before the ratio arm of the breaker engages.
const BREAKER_MIN_PREFIX: usize = 20;

/// Failure ratio above which a batch with enough completed probes aborts.
const BREAKER_RATIO: f64 = 0.05;

/// Absolute failure count that aborts a batch still short of the prefix.
const BREAKER_MIN_FAILURES: usize = 5;

/// One failed probe, with the context a boundary needs to act on it.
#[derive(Debug)]
pub struct ProbeFailure {
  pub symbol: Symbol,
  pub date: NaiveDate,
  pub error: bfa_core::Error,
}

/// The outcome of one batch: successes keyed by symbol, failures with their
/// causes, and whether the circuit breaker cut the batch short.
#[derive(Debug)]
pub struct BatchOutcome {
  pub batch_id: String,
  pub date: NaiveDate,
  pub records: BTreeMap<Symbol, ProbeRecord>,
  pub failures: Vec<ProbeFailure>,
  pub breaker_tripped: bool,
}

impl BatchOutcome {
  pub fn is_clean(&self) -> bool {
    self.failures.is_empty() && !self.breaker_tripped
  }

  /// Strict view: a batch with any failure is an error. The partial map
  /// stays accessible through the outcome itself so callers can commit what
  /// succeeded before raising.
  pub fn as_error(&self) -> Option<PipelineError> {
    if self.breaker_tripped {
      return Some(PipelineError::CircuitBreaker {
        batch_id: self.batch_id.clone(),
        failures: self.failures.len(),
        completed: self.records.len() + self.failures.len(),
      });
    }
    self.failures.first().map(|failure| PipelineError::BatchFailures {
      batch_id: self.batch_id.clone(),
      failures: self.failures.len(),
      first: format!("{} {}: {}", failure.symbol, failure.date, failure.error),
    })
  }
}

/// Whether a batch should abort, given its completed prefix.
///
/// Once at least 20 probes completed, a failure ratio above 5% trips; below
/// that prefix an absolute count of 5 failures trips (a total-bucket outage
/// in a small batch must not wait for a prefix it can never reach).
fn breaker_should_trip(completed: usize, failures: usize) -> bool {
  if failures == 0 {
    return false;
  }
  if completed >= BREAKER_MIN_PREFIX {
    failures as f64 / completed as f64 > BREAKER_RATIO
  } else {
    failures >= BREAKER_MIN_FAILURES
  }
}

fn generate_batch_id() -> String {
  uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Probe one date across many symbols with a fixed worker pool of size
/// `workers`. Results arrive in completion order and are drained into the
/// outcome map; in-flight probes are dropped the moment the breaker trips.
pub async fn probe_batch(
  client: &HttpClient,
  symbols: &[Symbol],
  date: NaiveDate,
  workers: usize,
  batch_id: Option<String>,
) -> PipelineResult<BatchOutcome> {
  if workers == 0 {
    return Err(PipelineError::Config("worker pool size must be at least 1".to_string()));
  }
  let batch_id = batch_id.unwrap_or_else(generate_batch_id);
  debug!(batch_id = %batch_id, %date, symbols = symbols.len(), workers, "batch start");

  let semaphore = Arc::new(Semaphore::new(workers));
  let mut in_flight = stream::iter(symbols.iter().cloned().map(|symbol| {
    let semaphore = semaphore.clone();
    async move {
      let _permit =
        semaphore.acquire().await.expect("Semaphore should not be closed during operation");
      let result = client.probe(&symbol, date).await;
      (symbol, result)
    }
  }))
  .buffer_unordered(workers);

  let mut records = BTreeMap::new();
  let mut failures = Vec::new();
  let mut breaker_tripped = false;

  while let Some((symbol, result)) = in_flight.next().await {
    match result {
      Ok(record) => {
        records.insert(symbol, record);
      }
      Err(error) => {
        warn!(batch_id = %batch_id, symbol = %symbol, %date, %error, "probe failed");
        failures.push(ProbeFailure { symbol, date, error });
      }
    }

    if breaker_should_trip(records.len() + failures.len(), failures.len()) {
      breaker_tripped = true;
      warn!(
        batch_id = %batch_id,
        %date,
        failures = failures.len(),
        completed = records.len() + failures.len(),
        "circuit breaker tripped, aborting batch"
      );
      break;
    }
  }
  drop(in_flight);

  debug!(
    batch_id = %batch_id,
    %date,
    ok = records.len(),
    failed = failures.len(),
    breaker_tripped,
    "batch complete"
  );

  Ok(BatchOutcome { batch_id, date, records, failures, breaker_tripped })
}

#[cfg(test)]
mod tests {
  use super::*;
  use bfa_core::Config;

  fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).unwrap()
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_breaker_zero_failures_never_trips() {
    assert!(!breaker_should_trip(0, 0));
    assert!(!breaker_should_trip(700, 0));
  }

  #[test]
  fn test_breaker_small_batch_trips_on_fifth_failure() {
    // 3 successes, failures arriving one by one.
    assert!(!breaker_should_trip(4, 1));
    assert!(!breaker_should_trip(7, 4));
    assert!(breaker_should_trip(8, 5));
  }

  #[test]
  fn test_breaker_single_failure_in_large_prefix_does_not_trip() {
    assert!(!breaker_should_trip(150, 1));
  }

  #[test]
  fn test_breaker_ratio_boundary() {
    // 4.9% of a 1000-probe prefix: stays up.
    assert!(!breaker_should_trip(1000, 49));
    // 5.1%: trips.
    assert!(breaker_should_trip(1000, 51));
    // Exactly 5% is not "exceeds".
    assert!(!breaker_should_trip(1000, 50));
  }

  #[test]
  fn test_batch_id_is_short_and_hex() {
    let id = generate_batch_id();
    assert_eq!(id.len(), 8);
    assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
  }

  #[test]
  fn test_clean_outcome_has_no_error() {
    let outcome = BatchOutcome {
      batch_id: "a1b2c3d4".to_string(),
      date: date(2024, 6, 1),
      records: BTreeMap::new(),
      failures: Vec::new(),
      breaker_tripped: false,
    };
    assert!(outcome.is_clean());
    assert!(outcome.as_error().is_none());
  }

  #[test]
  fn test_failed_outcome_raises_strictly() {
    let outcome = BatchOutcome {
      batch_id: "a1b2c3d4".to_string(),
      date: date(2024, 6, 1),
      records: BTreeMap::new(),
      failures: vec![ProbeFailure {
        symbol: symbol("BTCUSDT"),
        date: date(2024, 6, 1),
        error: bfa_core::Error::Timeout { url: "https://x".to_string() },
      }],
      breaker_tripped: false,
    };
    assert!(!outcome.is_clean());
    assert!(matches!(outcome.as_error(), Some(PipelineError::BatchFailures { .. })));
  }

  #[test]
  fn test_tripped_outcome_reports_breaker() {
    let outcome = BatchOutcome {
      batch_id: "a1b2c3d4".to_string(),
      date: date(2024, 6, 1),
      records: BTreeMap::new(),
      failures: Vec::new(),
      breaker_tripped: true,
    };
    assert!(matches!(outcome.as_error(), Some(PipelineError::CircuitBreaker { .. })));
  }

  #[tokio::test]
  async fn test_total_outage_trips_breaker_and_keeps_partials() {
    // Nothing listens on this port; every probe fails fast with a network
    // error, so the batch must abort on the absolute-failures arm.
    let mut config = Config::default_with_root(std::path::Path::new("/tmp/bfa"));
    config.archive_base_url = "http://127.0.0.1:9".to_string();
    config.head_timeout_secs = 2;
    let client = HttpClient::new(&config).await.unwrap();

    let symbols: Vec<Symbol> = (0..10)
      .map(|i| Symbol::parse(&format!("AA{i}USDT")).unwrap())
      .collect();
    let outcome =
      probe_batch(&client, &symbols, date(2024, 6, 1), 10, Some("feedbeef".to_string()))
        .await
        .unwrap();

    assert!(outcome.breaker_tripped);
    assert!(outcome.failures.len() >= BREAKER_MIN_FAILURES);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.batch_id, "feedbeef");
    assert!(matches!(outcome.as_error(), Some(PipelineError::CircuitBreaker { .. })));
  }

  #[tokio::test]
  async fn test_zero_workers_is_a_config_error() {
    let config = Config::default_with_root(std::path::Path::new("/tmp/bfa"));
    let client = HttpClient::new(&config).await.unwrap();
    let result = probe_batch(&client, &[], date(2024, 6, 1), 0, None).await;
    assert!(matches!(result, Err(PipelineError::Config(_))));
  }
}
