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

//! Canonical schema: one ordered column list drives both the DDL and the
//! drift guard, so the two can never disagree with each other.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const PRIMARY_TABLE: &str = "daily_availability";
pub const COUNTS_TABLE: &str = "daily_symbol_counts";

/// One column of the canonical schema, as it appears both in the descriptor
/// manifest and in `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
  pub name: String,
  pub data_type: String,
  pub nullable: bool,
}

impl ColumnDescriptor {
  fn new(name: &str, data_type: &str, nullable: bool) -> Self {
    Self { name: name.to_string(), data_type: data_type.to_string(), nullable }
  }
}

/// The canonical 17-column list for `daily_availability`, in table order.
pub fn canonical_columns() -> Vec<ColumnDescriptor> {
  vec![
    ColumnDescriptor::new("date", "DATE", false),
    ColumnDescriptor::new("symbol", "VARCHAR", false),
    ColumnDescriptor::new("available", "BOOLEAN", false),
    ColumnDescriptor::new("file_size_bytes", "UBIGINT", true),
    ColumnDescriptor::new("last_modified", "VARCHAR", true),
    ColumnDescriptor::new("url", "VARCHAR", false),
    ColumnDescriptor::new("status_code", "INTEGER", false),
    ColumnDescriptor::new("probe_timestamp", "TIMESTAMP", false),
    ColumnDescriptor::new("quote_volume_usdt", "DOUBLE", true),
    ColumnDescriptor::new("trade_count", "BIGINT", true),
    ColumnDescriptor::new("volume_base", "DOUBLE", true),
    ColumnDescriptor::new("taker_buy_volume_base", "DOUBLE", true),
    ColumnDescriptor::new("taker_buy_quote_volume_usdt", "DOUBLE", true),
    ColumnDescriptor::new("open_price", "DOUBLE", true),
    ColumnDescriptor::new("high_price", "DOUBLE", true),
    ColumnDescriptor::new("low_price", "DOUBLE", true),
    ColumnDescriptor::new("close_price", "DOUBLE", true),
  ]
}

/// DDL for the primary table, generated from the canonical column list.
pub fn create_primary_table_sql() -> String {
  let columns: Vec<String> = canonical_columns()
    .iter()
    .map(|column| {
      let null_clause = if column.nullable { "" } else { " NOT NULL" };
      format!("  {} {}{}", column.name, column.data_type, null_clause)
    })
    .collect();
  format!(
    "CREATE TABLE IF NOT EXISTS {PRIMARY_TABLE} (\n{},\n  PRIMARY KEY (date, symbol)\n);",
    columns.join(",\n")
  )
}

pub fn create_counts_table_sql() -> String {
  format!(
    "CREATE TABLE IF NOT EXISTS {COUNTS_TABLE} (\n  date DATE PRIMARY KEY,\n  available_count BIGINT NOT NULL\n);"
  )
}

/// Covering indices for the date axis, the symbol axis, the primary key
/// shape, and the ranking scan.
pub fn create_index_sql() -> Vec<String> {
  vec![
    format!("CREATE INDEX IF NOT EXISTS idx_availability_date ON {PRIMARY_TABLE} (date);"),
    format!("CREATE INDEX IF NOT EXISTS idx_availability_symbol ON {PRIMARY_TABLE} (symbol);"),
    format!(
      "CREATE INDEX IF NOT EXISTS idx_availability_date_symbol ON {PRIMARY_TABLE} (date, symbol);"
    ),
    format!(
      "CREATE INDEX IF NOT EXISTS idx_availability_quote_volume ON {PRIMARY_TABLE} (quote_volume_usdt, date);"
    ),
  ]
}

/// Load the canonical descriptor manifest (JSON array of columns).
pub fn load_descriptor(path: &Path) -> StoreResult<Vec<ColumnDescriptor>> {
  let raw = std::fs::read_to_string(path).map_err(|e| {
    StoreError::Descriptor(format!("cannot read descriptor at {}: {e}", path.display()))
  })?;
  let columns: Vec<ColumnDescriptor> = serde_json::from_str(&raw)
    .map_err(|e| StoreError::Descriptor(format!("malformed descriptor: {e}")))?;
  if columns.is_empty() {
    return Err(StoreError::Descriptor("descriptor lists no columns".to_string()));
  }
  Ok(columns)
}

/// Serialize the canonical column list, for bootstrapping a descriptor
/// manifest.
pub fn descriptor_json() -> String {
  serde_json::to_string_pretty(&canonical_columns()).expect("canonical columns serialize")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_canonical_columns_count() {
    assert_eq!(canonical_columns().len(), 17);
  }

  #[test]
  fn test_canonical_columns_key_first() {
    let columns = canonical_columns();
    assert_eq!(columns[0].name, "date");
    assert_eq!(columns[1].name, "symbol");
    assert!(!columns[0].nullable);
    assert!(!columns[1].nullable);
  }

  #[test]
  fn test_size_nullable_iff_not_available() {
    let columns = canonical_columns();
    let size = columns.iter().find(|c| c.name == "file_size_bytes").unwrap();
    assert_eq!(size.data_type, "UBIGINT");
    assert!(size.nullable);
  }

  #[test]
  fn test_primary_ddl_contains_key_and_all_columns() {
    let ddl = create_primary_table_sql();
    assert!(ddl.contains("PRIMARY KEY (date, symbol)"));
    for column in canonical_columns() {
      assert!(ddl.contains(&column.name), "missing {} in DDL", column.name);
    }
  }

  #[test]
  fn test_index_sql_is_idempotent_by_construction() {
    for sql in create_index_sql() {
      assert!(sql.starts_with("CREATE INDEX IF NOT EXISTS"));
    }
    assert_eq!(create_index_sql().len(), 4);
  }

  #[test]
  fn test_descriptor_json_round_trips() {
    let json = descriptor_json();
    let parsed: Vec<ColumnDescriptor> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, canonical_columns());
  }

  #[test]
  fn test_load_descriptor_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema_descriptor.json");
    std::fs::write(&path, descriptor_json()).unwrap();
    let loaded = load_descriptor(&path).unwrap();
    assert_eq!(loaded, canonical_columns());
  }

  #[test]
  fn test_load_descriptor_missing_file_is_descriptor_error() {
    let err = load_descriptor(Path::new("/nonexistent/schema.json")).unwrap_err();
    assert!(matches!(err, StoreError::Descriptor(_)));
  }
}
