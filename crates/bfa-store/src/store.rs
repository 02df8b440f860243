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

//! The availability store proper: exclusive writer handle, idempotent DDL,
//! primary-key-keyed upserts, and the read paths the pipeline needs.

use crate::error::{StoreError, StoreResult};
use crate::models::{AvailabilityRow, KlineAggregates};
use crate::schema::{
  self, create_counts_table_sql, create_index_sql, create_primary_table_sql, ColumnDescriptor,
  COUNTS_TABLE, PRIMARY_TABLE,
};
use bfa_core::Symbol;
use chrono::{NaiveDate, NaiveDateTime};
use duckdb::{params, AccessMode, Config as DuckConfig, Connection};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Exclusive handle over the single-file store.
///
/// One writer per run; concurrent readers attach via [`Self::open_read_only`]
/// and accept the file as a point-in-time snapshot.
pub struct AvailabilityStore {
  conn: Connection,
}

impl AvailabilityStore {
  /// Open (creating if needed) the store file for exclusive writing.
  pub fn open(path: &Path) -> StoreResult<Self> {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }
    let conn = Connection::open(path)?;
    Ok(Self { conn })
  }

  /// Open an in-memory store (tests and dry runs).
  pub fn open_in_memory() -> StoreResult<Self> {
    Ok(Self { conn: Connection::open_in_memory()? })
  }

  /// Attach an existing store file read-only.
  pub fn open_read_only(path: &Path) -> StoreResult<Self> {
    let config = DuckConfig::default().access_mode(AccessMode::ReadOnly)?;
    let conn = Connection::open_with_flags(path, config)?;
    Ok(Self { conn })
  }

  pub(crate) fn connection(&self) -> &Connection {
    &self.conn
  }

  /// Idempotent DDL: primary table, counts table, indices. Safe to call on
  /// an already-populated store without changing any row.
  pub fn create_if_absent(&self) -> StoreResult<()> {
    self.conn.execute_batch(&create_primary_table_sql())?;
    self.conn.execute_batch(&create_counts_table_sql())?;
    for sql in create_index_sql() {
      self.conn.execute_batch(&sql)?;
    }
    debug!("schema ensured");
    Ok(())
  }

  /// Upsert a batch of rows and refresh the derived counts, in one
  /// transaction. Re-inserting an existing `(date, symbol)` overwrites every
  /// field; last writer wins.
  pub fn upsert_batch(&mut self, rows: &[AvailabilityRow]) -> StoreResult<usize> {
    let tx = self.conn.transaction()?;
    let mut written = 0usize;
    {
      let mut stmt = tx.prepare(UPSERT_SQL)?;
      for row in rows {
        stmt.execute(params![
          row.date,
          row.symbol.as_str(),
          row.available,
          row.file_size_bytes,
          row.last_modified,
          row.url,
          row.status_code as i32,
          row.probe_timestamp,
          row.quote_volume_usdt,
          row.trade_count,
          row.volume_base,
          row.taker_buy_volume_base,
          row.taker_buy_quote_volume_usdt,
          row.open_price,
          row.high_price,
          row.low_price,
          row.close_price,
        ])?;
        written += 1;
      }
    }
    refresh_counts(&tx)?;
    tx.commit()?;
    info!(rows = written, "batch committed");
    Ok(written)
  }

  /// Merge kline aggregates into existing rows for one date, in one
  /// transaction. Probe-observation fields are untouched.
  pub fn apply_aggregates(
    &mut self,
    updates: &[(NaiveDate, Symbol, KlineAggregates)],
  ) -> StoreResult<usize> {
    let tx = self.conn.transaction()?;
    let mut applied = 0usize;
    {
      let mut stmt = tx.prepare(&format!(
        "UPDATE {PRIMARY_TABLE} SET \
           quote_volume_usdt = ?, trade_count = ?, volume_base = ?, \
           taker_buy_volume_base = ?, taker_buy_quote_volume_usdt = ?, \
           open_price = ?, high_price = ?, low_price = ?, close_price = ? \
         WHERE date = ? AND symbol = ?"
      ))?;
      for (date, symbol, agg) in updates {
        applied += stmt.execute(params![
          agg.quote_volume_usdt,
          agg.trade_count,
          agg.volume_base,
          agg.taker_buy_volume_base,
          agg.taker_buy_quote_volume_usdt,
          agg.open_price,
          agg.high_price,
          agg.low_price,
          agg.close_price,
          date,
          symbol.as_str(),
        ])?;
      }
    }
    tx.commit()?;
    Ok(applied)
  }

  /// Recompute the derived counts table from scratch. Applying this twice
  /// yields the same counts.
  pub fn refresh_daily_counts(&mut self) -> StoreResult<()> {
    let tx = self.conn.transaction()?;
    refresh_counts(&tx)?;
    tx.commit()?;
    Ok(())
  }

  /// Every symbol that has ever been written, ascending.
  pub fn symbols_ever_seen(&self) -> StoreResult<BTreeSet<Symbol>> {
    let mut stmt =
      self.conn.prepare(&format!("SELECT DISTINCT symbol FROM {PRIMARY_TABLE} ORDER BY symbol"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut symbols = BTreeSet::new();
    for name in names {
      let name = name?;
      let symbol = Symbol::parse(&name)
        .map_err(|_| StoreError::Corrupt(format!("stored symbol '{name}' is out of shape")))?;
      symbols.insert(symbol);
    }
    Ok(symbols)
  }

  /// Distinct dates present, ascending.
  pub fn distinct_dates(&self) -> StoreResult<Vec<NaiveDate>> {
    let mut stmt =
      self.conn.prepare(&format!("SELECT DISTINCT date FROM {PRIMARY_TABLE} ORDER BY date"))?;
    let rows = stmt.query_map([], |row| row.get::<_, NaiveDate>(0))?;
    let mut dates = Vec::new();
    for date in rows {
      dates.push(date?);
    }
    Ok(dates)
  }

  /// Rows per date (available or not), ascending by date.
  pub fn daily_row_counts(&self) -> StoreResult<Vec<(NaiveDate, u64)>> {
    let mut stmt = self.conn.prepare(&format!(
      "SELECT date, count(*) FROM {PRIMARY_TABLE} GROUP BY date ORDER BY date"
    ))?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, i64>(1)?)))?;
    let mut counts = Vec::new();
    for row in rows {
      let (date, count) = row?;
      counts.push((date, count as u64));
    }
    Ok(counts)
  }

  /// The derived counts table, ascending by date.
  pub fn daily_counts(&self) -> StoreResult<Vec<(NaiveDate, i64)>> {
    let mut stmt = self
      .conn
      .prepare(&format!("SELECT date, available_count FROM {COUNTS_TABLE} ORDER BY date"))?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, i64>(1)?)))?;
    let mut counts = Vec::new();
    for row in rows {
      counts.push(row?);
    }
    Ok(counts)
  }

  /// Latest date present in the store, if any.
  pub fn latest_date(&self) -> StoreResult<Option<NaiveDate>> {
    let latest = self.conn.query_row(
      &format!("SELECT max(date) FROM {PRIMARY_TABLE}"),
      [],
      |row| row.get::<_, Option<NaiveDate>>(0),
    )?;
    Ok(latest)
  }

  /// Symbols with `available = true` on the given date, ascending.
  pub fn available_symbols_on(&self, date: NaiveDate) -> StoreResult<BTreeSet<Symbol>> {
    let mut stmt = self.conn.prepare(&format!(
      "SELECT symbol FROM {PRIMARY_TABLE} WHERE date = ? AND available ORDER BY symbol"
    ))?;
    let names = stmt.query_map(params![date], |row| row.get::<_, String>(0))?;
    let mut symbols = BTreeSet::new();
    for name in names {
      let name = name?;
      let symbol = Symbol::parse(&name)
        .map_err(|_| StoreError::Corrupt(format!("stored symbol '{name}' is out of shape")))?;
      symbols.insert(symbol);
    }
    Ok(symbols)
  }

  /// One full row, if present.
  pub fn get_row(&self, date: NaiveDate, symbol: &Symbol) -> StoreResult<Option<AvailabilityRow>> {
    let mut stmt = self.conn.prepare(&format!(
      "SELECT date, symbol, available, file_size_bytes, last_modified, url, status_code, \
              probe_timestamp, quote_volume_usdt, trade_count, volume_base, \
              taker_buy_volume_base, taker_buy_quote_volume_usdt, open_price, high_price, \
              low_price, close_price \
       FROM {PRIMARY_TABLE} WHERE date = ? AND symbol = ?"
    ))?;
    let mut rows = stmt.query_map(params![date, symbol.as_str()], |row| {
      Ok((
        row.get::<_, NaiveDate>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, bool>(2)?,
        row.get::<_, Option<u64>>(3)?,
        row.get::<_, Option<String>>(4)?,
        row.get::<_, String>(5)?,
        row.get::<_, i32>(6)?,
        row.get::<_, NaiveDateTime>(7)?,
        row.get::<_, Option<f64>>(8)?,
        row.get::<_, Option<i64>>(9)?,
        row.get::<_, Option<f64>>(10)?,
        row.get::<_, Option<f64>>(11)?,
        (
          row.get::<_, Option<f64>>(12)?,
          row.get::<_, Option<f64>>(13)?,
          row.get::<_, Option<f64>>(14)?,
          row.get::<_, Option<f64>>(15)?,
          row.get::<_, Option<f64>>(16)?,
        ),
      ))
    })?;

    let Some(row) = rows.next() else {
      return Ok(None);
    };
    let (
      date,
      symbol_name,
      available,
      file_size_bytes,
      last_modified,
      url,
      status_code,
      probe_timestamp,
      quote_volume_usdt,
      trade_count,
      volume_base,
      taker_buy_volume_base,
      (taker_buy_quote_volume_usdt, open_price, high_price, low_price, close_price),
    ) = row?;

    let symbol = Symbol::parse(&symbol_name)
      .map_err(|_| StoreError::Corrupt(format!("stored symbol '{symbol_name}' is out of shape")))?;

    Ok(Some(AvailabilityRow {
      date,
      symbol,
      available,
      file_size_bytes,
      last_modified,
      url,
      status_code: status_code as u16,
      probe_timestamp,
      quote_volume_usdt,
      trade_count,
      volume_base,
      taker_buy_volume_base,
      taker_buy_quote_volume_usdt,
      open_price,
      high_price,
      low_price,
      close_price,
    }))
  }

  /// Total row count in the primary table.
  pub fn row_count(&self) -> StoreResult<u64> {
    let count = self.conn.query_row(
      &format!("SELECT count(*) FROM {PRIMARY_TABLE}"),
      [],
      |row| row.get::<_, i64>(0),
    )?;
    Ok(count as u64)
  }

  /// The live column list of the primary table, in ordinal order, as the
  /// drift guard sees it.
  pub fn live_columns(&self) -> StoreResult<Vec<ColumnDescriptor>> {
    let mut stmt = self.conn.prepare(
      "SELECT column_name, data_type, is_nullable \
       FROM information_schema.columns \
       WHERE table_name = ? \
       ORDER BY ordinal_position",
    )?;
    let rows = stmt.query_map(params![PRIMARY_TABLE], |row| {
      Ok(ColumnDescriptor {
        name: row.get::<_, String>(0)?,
        data_type: row.get::<_, String>(1)?,
        nullable: row.get::<_, String>(2)? == "YES",
      })
    })?;
    let mut columns = Vec::new();
    for column in rows {
      columns.push(column?);
    }
    Ok(columns)
  }

  /// Verify the live schema against a canonical descriptor. Terminal on
  /// mismatch; must run before any mutation.
  pub fn check_schema(&self, expected: &[ColumnDescriptor]) -> StoreResult<()> {
    let live = self.live_columns()?;
    let mismatches = crate::guard::verify_columns(expected, &live);
    if mismatches.is_empty() {
      Ok(())
    } else {
      Err(StoreError::Drift(mismatches))
    }
  }
}

const UPSERT_SQL: &str = "INSERT OR REPLACE INTO daily_availability (\
   date, symbol, available, file_size_bytes, last_modified, url, status_code, \
   probe_timestamp, quote_volume_usdt, trade_count, volume_base, \
   taker_buy_volume_base, taker_buy_quote_volume_usdt, open_price, high_price, \
   low_price, close_price\
 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Rebuild the counts table from scratch. Runs inside the caller's
/// transaction so a batch and its counts commit together or not at all.
fn refresh_counts(conn: &Connection) -> StoreResult<()> {
  conn.execute_batch(&format!(
    "DELETE FROM {COUNTS_TABLE};\n\
     INSERT INTO {COUNTS_TABLE} \
       SELECT date, count(*) FILTER (WHERE available) FROM {PRIMARY_TABLE} GROUP BY date;"
  ))?;
  Ok(())
}

/// Convenience wrapper used by the pipeline: ensure the schema exists, then
/// check it against the descriptor manifest.
pub fn open_checked(path: &Path, descriptor_path: &Path) -> StoreResult<AvailabilityStore> {
  let store = AvailabilityStore::open(path)?;
  store.create_if_absent()?;
  let expected = schema::load_descriptor(descriptor_path)?;
  store.check_schema(&expected)?;
  Ok(store)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::canonical_columns;

  fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).unwrap()
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn now() -> NaiveDateTime {
    date(2024, 6, 2).and_hms_opt(4, 0, 0).unwrap()
  }

  fn store() -> AvailabilityStore {
    let store = AvailabilityStore::open_in_memory().unwrap();
    store.create_if_absent().unwrap();
    store
  }

  fn observed(d: NaiveDate, s: &str, size: u64) -> AvailabilityRow {
    AvailabilityRow::observed(
      d,
      symbol(s),
      format!("https://data.binance.vision/{s}-{d}.zip"),
      size,
      "Sun, 02 Jun 2024 03:00:00 GMT".to_string(),
      now(),
    )
  }

  fn missing(d: NaiveDate, s: &str) -> AvailabilityRow {
    AvailabilityRow::missing(
      d,
      symbol(s),
      format!("https://data.binance.vision/{s}-{d}.zip"),
      now(),
    )
  }

  #[test]
  fn test_create_if_absent_is_idempotent() {
    let mut store = store();
    store.upsert_batch(&[observed(date(2024, 6, 1), "BTCUSDT", 57_000)]).unwrap();
    store.create_if_absent().unwrap();
    assert_eq!(store.row_count().unwrap(), 1);
  }

  #[test]
  fn test_cold_start_two_symbols_one_date() {
    let mut store = store();
    let d = date(2024, 6, 1);
    let written = store
      .upsert_batch(&[observed(d, "BTCUSDT", 57_000), observed(d, "ETHUSDT", 40_000)])
      .unwrap();
    assert_eq!(written, 2);
    assert_eq!(store.daily_counts().unwrap(), vec![(d, 2)]);
    let row = store.get_row(d, &symbol("BTCUSDT")).unwrap().unwrap();
    assert!(row.available);
    assert_eq!(row.file_size_bytes, Some(57_000));
  }

  #[test]
  fn test_upsert_is_last_writer_wins() {
    let mut store = store();
    let d = date(2024, 6, 1);
    store.upsert_batch(&[observed(d, "BTCUSDT", 57_000)]).unwrap();
    store.upsert_batch(&[observed(d, "BTCUSDT", 58_500)]).unwrap();
    assert_eq!(store.row_count().unwrap(), 1);
    let row = store.get_row(d, &symbol("BTCUSDT")).unwrap().unwrap();
    assert_eq!(row.file_size_bytes, Some(58_500));
  }

  #[test]
  fn test_available_flip_to_missing_is_a_legitimate_overwrite() {
    let mut store = store();
    let d = date(2024, 6, 1);
    store.upsert_batch(&[observed(d, "BTCUSDT", 57_000)]).unwrap();
    store.upsert_batch(&[missing(d, "BTCUSDT")]).unwrap();
    let row = store.get_row(d, &symbol("BTCUSDT")).unwrap().unwrap();
    assert!(!row.available);
    assert_eq!(row.status_code, 404);
    assert!(row.file_size_bytes.is_none());
    assert_eq!(store.daily_counts().unwrap(), vec![(d, 0)]);
  }

  #[test]
  fn test_counts_track_only_available_rows() {
    let mut store = store();
    let d1 = date(2024, 5, 31);
    let d2 = date(2024, 6, 1);
    store
      .upsert_batch(&[
        observed(d1, "BTCUSDT", 56_000),
        missing(d1, "ETHUSDT"),
        observed(d2, "BTCUSDT", 57_000),
        observed(d2, "ETHUSDT", 40_000),
      ])
      .unwrap();
    assert_eq!(store.daily_counts().unwrap(), vec![(d1, 1), (d2, 2)]);
  }

  #[test]
  fn test_refresh_daily_counts_is_idempotent() {
    let mut store = store();
    store.upsert_batch(&[observed(date(2024, 6, 1), "BTCUSDT", 57_000)]).unwrap();
    let first = store.daily_counts().unwrap();
    store.refresh_daily_counts().unwrap();
    assert_eq!(store.daily_counts().unwrap(), first);
  }

  #[test]
  fn test_apply_aggregates_preserves_probe_fields() {
    let mut store = store();
    let d = date(2024, 6, 1);
    store.upsert_batch(&[observed(d, "BTCUSDT", 57_000)]).unwrap();

    let agg = KlineAggregates {
      open_price: 67_500.1,
      high_price: 68_999.9,
      low_price: 67_100.0,
      close_price: 68_750.3,
      volume_base: 141_027.408,
      quote_volume_usdt: 9_596_811_417.28,
      trade_count: 2_210_717,
      taker_buy_volume_base: 70_290.1,
      taker_buy_quote_volume_usdt: 4_783_822_274.5,
    };
    let applied = store.apply_aggregates(&[(d, symbol("BTCUSDT"), agg)]).unwrap();
    assert_eq!(applied, 1);

    let row = store.get_row(d, &symbol("BTCUSDT")).unwrap().unwrap();
    assert_eq!(row.file_size_bytes, Some(57_000));
    assert_eq!(row.status_code, 200);
    assert_eq!(row.quote_volume_usdt, Some(9_596_811_417.28));
    assert_eq!(row.trade_count, Some(2_210_717));
  }

  #[test]
  fn test_apply_aggregates_to_absent_row_applies_nothing() {
    let mut store = store();
    let agg = KlineAggregates {
      open_price: 1.0,
      high_price: 1.0,
      low_price: 1.0,
      close_price: 1.0,
      volume_base: 1.0,
      quote_volume_usdt: 1.0,
      trade_count: 1,
      taker_buy_volume_base: 1.0,
      taker_buy_quote_volume_usdt: 1.0,
    };
    let applied =
      store.apply_aggregates(&[(date(2024, 6, 1), symbol("BTCUSDT"), agg)]).unwrap();
    assert_eq!(applied, 0);
  }

  #[test]
  fn test_symbols_ever_seen_is_sorted_union() {
    let mut store = store();
    store
      .upsert_batch(&[
        observed(date(2024, 6, 1), "ETHUSDT", 40_000),
        observed(date(2024, 5, 31), "BTCUSDT", 56_000),
        missing(date(2024, 6, 1), "ADAUSDT"),
      ])
      .unwrap();
    let seen: Vec<String> =
      store.symbols_ever_seen().unwrap().iter().map(|s| s.to_string()).collect();
    assert_eq!(seen, vec!["ADAUSDT", "BTCUSDT", "ETHUSDT"]);
  }

  #[test]
  fn test_latest_date_and_available_symbols() {
    let mut store = store();
    let d1 = date(2024, 5, 31);
    let d2 = date(2024, 6, 1);
    store
      .upsert_batch(&[
        observed(d1, "BTCUSDT", 56_000),
        observed(d2, "BTCUSDT", 57_000),
        missing(d2, "ETHUSDT"),
      ])
      .unwrap();
    assert_eq!(store.latest_date().unwrap(), Some(d2));
    let available: Vec<String> =
      store.available_symbols_on(d2).unwrap().iter().map(|s| s.to_string()).collect();
    assert_eq!(available, vec!["BTCUSDT"]);
  }

  #[test]
  fn test_latest_date_on_empty_store() {
    let store = store();
    assert_eq!(store.latest_date().unwrap(), None);
  }

  #[test]
  fn test_live_columns_match_canonical_on_fresh_store() {
    let store = store();
    let live = store.live_columns().unwrap();
    assert_eq!(live, canonical_columns());
  }

  #[test]
  fn test_check_schema_passes_on_fresh_store() {
    let store = store();
    assert!(store.check_schema(&canonical_columns()).is_ok());
  }

  #[test]
  fn test_reopen_read_only_sees_committed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("availability.duckdb");
    {
      let mut store = AvailabilityStore::open(&path).unwrap();
      store.create_if_absent().unwrap();
      store.upsert_batch(&[observed(date(2024, 6, 1), "BTCUSDT", 57_000)]).unwrap();
    }
    let reader = AvailabilityStore::open_read_only(&path).unwrap();
    assert_eq!(reader.row_count().unwrap(), 1);
  }
}
