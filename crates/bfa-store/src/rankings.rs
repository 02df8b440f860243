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

//! Rankings materializer: a rebuildable Parquet projection of the primary
//! table, one row per (date, symbol) with aggregates, ranked per date by
//! quote volume descending.
//!
//! Ties break lexicographically by symbol, so the rank is a stable bijection
//! onto 1..n for every date. The rank is recomputed across the full history
//! on each materialization; nothing incremental.

use crate::error::StoreResult;
use crate::schema::PRIMARY_TABLE;
use crate::store::AvailabilityStore;
use bfa_core::Symbol;
use chrono::NaiveDate;
use duckdb::params;
use std::path::Path;
use tracing::info;

/// One row of the rankings artifact, as queryable before export.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
  pub date: NaiveDate,
  pub symbol: Symbol,
  pub quote_volume_usdt: f64,
  pub trade_count: Option<i64>,
  pub rank: i32,
}

fn ranked_select() -> String {
  format!(
    "SELECT date, symbol, quote_volume_usdt, trade_count, volume_base, \
            taker_buy_volume_base, taker_buy_quote_volume_usdt, open_price, high_price, \
            low_price, close_price, \
            CAST(row_number() OVER ( \
              PARTITION BY date ORDER BY quote_volume_usdt DESC, symbol ASC \
            ) AS INTEGER) AS rank \
     FROM {PRIMARY_TABLE} \
     WHERE quote_volume_usdt IS NOT NULL"
  )
}

/// Write the rankings artifact next to the primary database. Returns the
/// number of ranked rows exported.
pub fn materialize_rankings(store: &AvailabilityStore, out_path: &Path) -> StoreResult<u64> {
  if let Some(parent) = out_path.parent() {
    if !parent.as_os_str().is_empty() {
      std::fs::create_dir_all(parent)?;
    }
  }

  // Single quotes in the path are doubled for the SQL literal.
  let literal = out_path.display().to_string().replace('\'', "''");
  let copy = format!(
    "COPY ({} ORDER BY date ASC, rank ASC) TO '{literal}' (FORMAT PARQUET)",
    ranked_select()
  );
  store.connection().execute_batch(&copy)?;

  let exported = store.connection().query_row(
    &format!("SELECT count(*) FROM {PRIMARY_TABLE} WHERE quote_volume_usdt IS NOT NULL"),
    [],
    |row| row.get::<_, i64>(0),
  )? as u64;

  info!(rows = exported, path = %out_path.display(), "rankings artifact written");
  Ok(exported)
}

/// The ranked rows for one date, ascending by rank (test and inspection
/// surface for the same projection the artifact exports).
pub fn ranked_rows_on(store: &AvailabilityStore, date: NaiveDate) -> StoreResult<Vec<RankedRow>> {
  let sql = format!("SELECT * FROM ({}) WHERE date = ? ORDER BY rank ASC", ranked_select());
  let mut stmt = store.connection().prepare(&sql)?;
  let rows = stmt.query_map(params![date], |row| {
    Ok((
      row.get::<_, NaiveDate>(0)?,
      row.get::<_, String>(1)?,
      row.get::<_, f64>(2)?,
      row.get::<_, Option<i64>>(3)?,
      row.get::<_, i32>(11)?,
    ))
  })?;

  let mut ranked = Vec::new();
  for row in rows {
    let (date, symbol_name, quote_volume_usdt, trade_count, rank) = row?;
    let symbol = Symbol::parse(&symbol_name).map_err(|_| {
      crate::error::StoreError::Corrupt(format!("stored symbol '{symbol_name}' is out of shape"))
    })?;
    ranked.push(RankedRow { date, symbol, quote_volume_usdt, trade_count, rank });
  }
  Ok(ranked)
}
