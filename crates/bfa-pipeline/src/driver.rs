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

//! Pipeline driver: the single-shot state machine
//! `INIT -> DISCOVER -> [BACKFILL_NEW] -> ROLLING -> KLINES -> VALIDATE ->
//! MATERIALIZE -> DONE`.
//!
//! Dates are processed sequentially; each date's batch and counts refresh
//! commit in one transaction or not at all. A hard-failed date never blocks
//! the remaining dates, but it does suppress validation and materialization
//! and forces a nonzero exit, so a later success cannot mask it.

use crate::batch_prober::{probe_batch, BatchOutcome};
use crate::catalog::SymbolCatalog;
use crate::error::{PipelineError, PipelineResult};
use crate::gap_detector::detect_gaps;
use crate::validator::{run_checks, Finding, ValidationReport};
use bfa_client::{DailyKlines, HttpClient, ListedArchive, LiveSymbols, ProbeOutcome};
use bfa_core::{Config, DateRange, Symbol};
use bfa_store::{
  materialize_rankings, open_checked, AvailabilityRow, AvailabilityStore, KlineAggregates,
};
use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Top-level run mode: the rolling daily window, or an explicit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
  Daily,
  Backfill { start: NaiveDate, end: NaiveDate },
}

/// One invocation's inputs.
#[derive(Debug, Clone)]
pub struct RunOptions {
  pub mode: RunMode,
  /// Restrict probing to these symbols (ad-hoc runs). Discovery and gap
  /// repair are skipped when set.
  pub symbols: Option<Vec<Symbol>>,
  pub show_progress: bool,
}

/// What one invocation did, surfaced as publication metadata at DONE.
#[derive(Debug, Default)]
pub struct RunSummary {
  pub dates_committed: Vec<NaiveDate>,
  pub dates_failed: Vec<(NaiveDate, String)>,
  pub rows_written: u64,
  pub aggregates_applied: u64,
  pub discovered: Vec<Symbol>,
  pub backfilled_symbols: usize,
  pub backfilled_rows: u64,
  pub findings: Vec<Finding>,
  /// Set iff the run reached MATERIALIZE.
  pub rankings_rows: Option<u64>,
}

impl RunSummary {
  /// A run succeeded iff every date committed and MATERIALIZE ran.
  /// Validator findings do not factor in.
  pub fn succeeded(&self) -> bool {
    self.dates_failed.is_empty() && self.rankings_rows.is_some()
  }
}

/// The single-shot pipeline driver. Owns the store file and the catalog
/// manifest for the duration of one run; everything else is stateless.
pub struct PipelineDriver {
  config: Config,
  client: HttpClient,
}

impl PipelineDriver {
  pub async fn new(config: Config) -> PipelineResult<Self> {
    if config.workers == 0 {
      return Err(PipelineError::Config("worker pool size must be at least 1".to_string()));
    }
    let client = HttpClient::new(&config).await?;
    Ok(Self { config, client })
  }

  pub async fn run(&self, options: RunOptions) -> PipelineResult<RunSummary> {
    // INIT: resolve the date axis before touching anything.
    let range = match options.mode {
      RunMode::Daily => {
        DateRange::rolling_window(Utc::now().date_naive(), self.config.lookback_days)?
      }
      RunMode::Backfill { start, end } => DateRange::new(start, end)?,
    };

    // The drift guard is the first check of every invocation; a mismatch is
    // terminal before any row is touched.
    let mut store = open_checked(&self.config.db_path, &self.config.schema_path)?;
    info!(start = %range.start(), end = %range.end(), "pipeline run starting");

    let mut summary = RunSummary::default();

    // DISCOVER
    let mut catalog = SymbolCatalog::load(&self.config.symbols_path)?;
    let live_result = self.client.fetch_live_symbols().await;
    if options.symbols.is_none() {
      match &live_result {
        Ok(live) => {
          let added = catalog.merge(live);
          if !added.is_empty() {
            catalog.persist()?;
            summary.discovered = added;
          }
        }
        Err(e) => {
          warn!(error = %e, "live discovery unavailable, continuing with known catalog");
        }
      }
    }

    let universe: Vec<Symbol> = match &options.symbols {
      Some(subset) => subset.clone(),
      None => catalog.symbols().iter().cloned().collect(),
    };
    if universe.is_empty() {
      return Err(PipelineError::Config(
        "no symbols to probe: catalog is empty and discovery was unavailable".to_string(),
      ));
    }

    // BACKFILL_NEW: close coverage gaps for newly listed contracts.
    if options.symbols.is_none() {
      let seen = store.symbols_ever_seen()?;
      let gaps = detect_gaps(catalog.symbols(), &seen);
      for symbol in &gaps {
        let archives = self.client.list_prefix(symbol).await?;
        let rows = rows_from_listing(symbol, &archives, None);
        info!(symbol = %symbol, rows = rows.len(), "backfilling newly listed contract");
        summary.backfilled_rows += store.upsert_batch(&rows)? as u64;
      }
      summary.backfilled_symbols = gaps.len();
    }

    // ROLLING: wide explicit ranges go through bulk listings, everything
    // else through per-date point probes.
    let use_listings = matches!(options.mode, RunMode::Backfill { .. })
      && range.num_days() > self.config.bulk_listing_threshold_days;
    if use_listings {
      self.rolling_by_listing(&mut store, &universe, &range, &options, &mut summary).await?;
    } else {
      self.rolling_by_probes(&mut store, &universe, &range, &options, &mut summary).await?;
    }

    // KLINES: enrich every committed date with the daily aggregates.
    let committed = summary.dates_committed.clone();
    for date in committed {
      match self.enrich_date(&mut store, date).await {
        Ok(applied) => summary.aggregates_applied += applied,
        Err(e) => {
          error!(%date, error = %e, "kline enrichment hard-failed the date");
          summary.dates_committed.retain(|d| *d != date);
          summary.dates_failed.push((date, e.to_string()));
        }
      }
    }

    // VALIDATE + MATERIALIZE run only for a fully committed collection pass;
    // the published database must never mask an earlier failure.
    if summary.dates_failed.is_empty() {
      let report = self.validate(&store, live_result.as_ref())?;
      summary.findings = report.findings;
      summary.rankings_rows =
        Some(materialize_rankings(&store, &self.config.rankings_path)?);
      info!(rows = summary.rows_written, "pipeline run complete");
    } else {
      warn!(
        failed = summary.dates_failed.len(),
        "skipping validation and materialization after hard-failed date(s)"
      );
    }

    Ok(summary)
  }

  async fn rolling_by_probes(
    &self,
    store: &mut AvailabilityStore,
    universe: &[Symbol],
    range: &DateRange,
    options: &RunOptions,
    summary: &mut RunSummary,
  ) -> PipelineResult<()> {
    let progress = date_progress(options.show_progress, range.num_days() as u64);

    for date in range.iter() {
      let outcome =
        probe_batch(&self.client, universe, date, self.config.workers, None).await?;
      let rows = rows_from_outcome(&outcome);
      summary.rows_written += store.upsert_batch(&rows)? as u64;

      match outcome.as_error() {
        None => summary.dates_committed.push(date),
        Some(e) => {
          error!(%date, error = %e, "date hard-failed, partial batch committed");
          summary.dates_failed.push((date, e.to_string()));
        }
      }

      if let Some(pb) = &progress {
        pb.inc(1);
      }
    }

    if let Some(pb) = progress {
      pb.finish_with_message("rolling window probed");
    }
    Ok(())
  }

  async fn rolling_by_listing(
    &self,
    store: &mut AvailabilityStore,
    universe: &[Symbol],
    range: &DateRange,
    options: &RunOptions,
    summary: &mut RunSummary,
  ) -> PipelineResult<()> {
    let progress = date_progress(options.show_progress, universe.len() as u64);

    for symbol in universe {
      let archives = self.client.list_prefix(symbol).await?;
      let rows = rows_from_listing(symbol, &archives, Some(range));
      summary.rows_written += store.upsert_batch(&rows)? as u64;
      if let Some(pb) = &progress {
        pb.inc(1);
      }
    }

    // Listings are grouped by symbol; once every symbol succeeded, every
    // date in the range is covered.
    summary.dates_committed.extend(range.iter());

    if let Some(pb) = progress {
      pb.finish_with_message("backfill listings complete");
    }
    Ok(())
  }

  /// Fetch and merge the daily kline aggregates for every available cell of
  /// one date. Partial aggregates are committed before the first fetch or
  /// parse failure is raised.
  async fn enrich_date(
    &self,
    store: &mut AvailabilityStore,
    date: NaiveDate,
  ) -> PipelineResult<u64> {
    let available: BTreeSet<Symbol> = store.available_symbols_on(date)?;
    if available.is_empty() {
      return Ok(0);
    }

    let client = &self.client;
    let semaphore = Arc::new(Semaphore::new(self.config.workers));
    let mut in_flight = stream::iter(available.into_iter().map(|symbol| {
      let semaphore = semaphore.clone();
      async move {
        let _permit =
          semaphore.acquire().await.expect("Semaphore should not be closed during operation");
        let result = client.fetch_daily_klines(&symbol, date).await;
        (symbol, result)
      }
    }))
    .buffer_unordered(self.config.workers);

    let mut updates: Vec<(NaiveDate, Symbol, KlineAggregates)> = Vec::new();
    let mut first_error: Option<bfa_core::Error> = None;
    while let Some((symbol, result)) = in_flight.next().await {
      match result {
        Ok(Some(klines)) => updates.push((date, symbol, aggregates_from(&klines))),
        Ok(None) => {} // not published yet; the cell keeps null aggregates
        Err(e) => {
          warn!(symbol = %symbol, %date, error = %e, "kline fetch failed");
          if first_error.is_none() {
            first_error = Some(e);
          }
        }
      }
    }
    drop(in_flight);

    let applied = store.apply_aggregates(&updates)? as u64;
    match first_error {
      Some(e) => Err(e.into()),
      None => Ok(applied),
    }
  }

  fn validate(
    &self,
    store: &AvailabilityStore,
    live: Result<&LiveSymbols, &bfa_core::Error>,
  ) -> PipelineResult<ValidationReport> {
    run_checks(store, live, self.config.completeness_min, self.config.completeness_max)
  }
}

fn date_progress(show: bool, len: u64) -> Option<ProgressBar> {
  if !show {
    return None;
  }
  let pb = ProgressBar::new(len);
  pb.set_style(
    ProgressStyle::default_bar()
      .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
      .expect("Invalid progress bar template")
      .progress_chars("##-"),
  );
  Some(pb)
}

/// Turn a batch outcome into upsertable rows; both semantic outcomes (200
/// and 404) become rows, failures do not.
fn rows_from_outcome(outcome: &BatchOutcome) -> Vec<AvailabilityRow> {
  outcome
    .records
    .values()
    .map(|record| match &record.outcome {
      ProbeOutcome::Available { file_size_bytes, last_modified } => AvailabilityRow::observed(
        record.date,
        record.symbol.clone(),
        record.url.clone(),
        *file_size_bytes,
        last_modified.clone(),
        record.probe_timestamp.naive_utc(),
      ),
      ProbeOutcome::Missing => AvailabilityRow::missing(
        record.date,
        record.symbol.clone(),
        record.url.clone(),
        record.probe_timestamp.naive_utc(),
      ),
    })
    .collect()
}

/// Rows for a symbol's listed archives, optionally restricted to a range.
/// Listing output is presence-only; absent dates produce no rows.
fn rows_from_listing(
  symbol: &Symbol,
  archives: &[ListedArchive],
  range: Option<&DateRange>,
) -> Vec<AvailabilityRow> {
  let now = Utc::now().naive_utc();
  archives
    .iter()
    .filter(|archive| match range {
      Some(range) => archive.date >= range.start() && archive.date <= range.end(),
      None => true,
    })
    .map(|archive| {
      AvailabilityRow::observed(
        archive.date,
        symbol.clone(),
        archive.url.clone(),
        archive.size,
        archive.last_modified.clone(),
        now,
      )
    })
    .collect()
}

fn aggregates_from(klines: &DailyKlines) -> KlineAggregates {
  KlineAggregates {
    open_price: klines.open_price,
    high_price: klines.high_price,
    low_price: klines.low_price,
    close_price: klines.close_price,
    volume_base: klines.volume_base,
    quote_volume_usdt: klines.quote_volume_usdt,
    trade_count: klines.trade_count,
    taker_buy_volume_base: klines.taker_buy_volume_base,
    taker_buy_quote_volume_usdt: klines.taker_buy_quote_volume_usdt,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use bfa_client::ProbeRecord;
  use std::collections::BTreeMap;

  fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).unwrap()
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn record(s: &str, d: NaiveDate, outcome: ProbeOutcome) -> ProbeRecord {
    let status = match outcome {
      ProbeOutcome::Available { .. } => 200,
      ProbeOutcome::Missing => 404,
    };
    ProbeRecord {
      symbol: symbol(s),
      date: d,
      url: format!("https://x/{s}.zip"),
      status_code: status,
      outcome,
      probe_timestamp: chrono::Utc::now(),
    }
  }

  #[test]
  fn test_rows_from_outcome_covers_both_semantic_outcomes() {
    let d = date(2024, 5, 31);
    let mut records = BTreeMap::new();
    records.insert(
      symbol("BTCUSDT"),
      record(
        "BTCUSDT",
        d,
        ProbeOutcome::Available {
          file_size_bytes: 56_000,
          last_modified: "Fri, 31 May 2024 03:00:00 GMT".to_string(),
        },
      ),
    );
    records.insert(symbol("ETHUSDT"), record("ETHUSDT", d, ProbeOutcome::Missing));

    let outcome = BatchOutcome {
      batch_id: "a1b2c3d4".to_string(),
      date: d,
      records,
      failures: Vec::new(),
      breaker_tripped: false,
    };

    let rows = rows_from_outcome(&outcome);
    assert_eq!(rows.len(), 2);
    let btc = rows.iter().find(|r| r.symbol.as_str() == "BTCUSDT").unwrap();
    assert!(btc.available);
    assert_eq!(btc.file_size_bytes, Some(56_000));
    let eth = rows.iter().find(|r| r.symbol.as_str() == "ETHUSDT").unwrap();
    assert!(!eth.available);
    assert_eq!(eth.status_code, 404);
  }

  #[test]
  fn test_rows_from_listing_is_presence_only_and_range_filtered() {
    let archives = vec![
      ListedArchive {
        date: date(2024, 5, 28),
        size: 40_000,
        last_modified: "Wed, 29 May 2024 02:09:02 GMT".to_string(),
        url: "https://x/NEWUSDT-1m-2024-05-28.zip".to_string(),
      },
      ListedArchive {
        date: date(2024, 5, 30),
        size: 41_000,
        last_modified: "Fri, 31 May 2024 02:10:11 GMT".to_string(),
        url: "https://x/NEWUSDT-1m-2024-05-30.zip".to_string(),
      },
    ];

    let all = rows_from_listing(&symbol("NEWUSDT"), &archives, None);
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|row| row.available && row.status_code == 200));

    let range = DateRange::new(date(2024, 5, 29), date(2024, 5, 31)).unwrap();
    let filtered = rows_from_listing(&symbol("NEWUSDT"), &archives, Some(&range));
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].date, date(2024, 5, 30));
  }

  #[test]
  fn test_aggregates_from_maps_all_nine_fields() {
    let klines = DailyKlines {
      open_price: 1.0,
      high_price: 2.0,
      low_price: 0.5,
      close_price: 1.5,
      volume_base: 10.0,
      quote_volume_usdt: 15.0,
      trade_count: 42,
      taker_buy_volume_base: 5.0,
      taker_buy_quote_volume_usdt: 7.5,
    };
    let agg = aggregates_from(&klines);
    assert_eq!(agg.quote_volume_usdt, 15.0);
    assert_eq!(agg.trade_count, 42);
    assert_eq!(agg.taker_buy_quote_volume_usdt, 7.5);
  }

  #[test]
  fn test_late_arrival_repair_flow() {
    let mut store = AvailabilityStore::open_in_memory().unwrap();
    store.create_if_absent().unwrap();

    // First run: one date, both archives present.
    let d1 = date(2024, 6, 1);
    let mut records = BTreeMap::new();
    for (s, size) in [("BTCUSDT", 57_000u64), ("ETHUSDT", 40_000u64)] {
      records.insert(
        symbol(s),
        record(
          s,
          d1,
          ProbeOutcome::Available {
            file_size_bytes: size,
            last_modified: "Sun, 02 Jun 2024 03:00:00 GMT".to_string(),
          },
        ),
      );
    }
    let first = BatchOutcome {
      batch_id: "11111111".to_string(),
      date: d1,
      records,
      failures: Vec::new(),
      breaker_tripped: false,
    };
    store.upsert_batch(&rows_from_outcome(&first)).unwrap();

    // Next day's run revisits yesterday and the day before; the earlier
    // date arrives late with one archive still missing.
    let d0 = date(2024, 5, 31);
    let mut records = BTreeMap::new();
    records.insert(
      symbol("BTCUSDT"),
      record(
        "BTCUSDT",
        d0,
        ProbeOutcome::Available {
          file_size_bytes: 56_000,
          last_modified: "Sat, 01 Jun 2024 03:00:00 GMT".to_string(),
        },
      ),
    );
    records.insert(symbol("ETHUSDT"), record("ETHUSDT", d0, ProbeOutcome::Missing));
    let second = BatchOutcome {
      batch_id: "22222222".to_string(),
      date: d0,
      records,
      failures: Vec::new(),
      breaker_tripped: false,
    };
    store.upsert_batch(&rows_from_outcome(&second)).unwrap();

    // The overlapping revisit of d1 rewrites logically unchanged rows.
    let repeat = BatchOutcome { batch_id: "33333333".to_string(), ..first };
    store.upsert_batch(&rows_from_outcome(&repeat)).unwrap();

    assert_eq!(store.daily_counts().unwrap(), vec![(d0, 1), (d1, 2)]);
    assert_eq!(store.row_count().unwrap(), 4);
    let eth = store.get_row(d0, &symbol("ETHUSDT")).unwrap().unwrap();
    assert!(!eth.available);
    assert_eq!(eth.status_code, 404);
  }

  #[test]
  fn test_summary_succeeds_only_after_materialize() {
    let mut summary = RunSummary::default();
    assert!(!summary.succeeded());

    summary.dates_committed.push(date(2024, 6, 1));
    summary.rankings_rows = Some(10);
    assert!(summary.succeeded());

    summary.dates_failed.push((date(2024, 6, 1), "breaker".to_string()));
    assert!(!summary.succeeded());
  }

  #[test]
  fn test_summary_findings_do_not_affect_success() {
    let mut summary = RunSummary::default();
    summary.rankings_rows = Some(0);
    summary.findings.push(Finding {
      check: crate::validator::CheckKind::Continuity,
      message: "1 missing date(s) in range: 2024-06-02".to_string(),
    });
    assert!(summary.succeeded());
  }
}
