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

use std::fmt;
use thiserror::Error;

/// A single discrepancy between the live schema and the canonical descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaMismatch {
  MissingColumn { name: String },
  UnexpectedColumn { name: String },
  TypeMismatch { column: String, expected: String, actual: String },
  CountMismatch { expected: usize, actual: usize },
}

impl fmt::Display for SchemaMismatch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SchemaMismatch::MissingColumn { name } => write!(f, "missing column '{name}'"),
      SchemaMismatch::UnexpectedColumn { name } => write!(f, "unexpected column '{name}'"),
      SchemaMismatch::TypeMismatch { column, expected, actual } => {
        write!(f, "column '{column}' is {actual}, expected {expected}")
      }
      SchemaMismatch::CountMismatch { expected, actual } => {
        write!(f, "{actual} columns, expected {expected}")
      }
    }
  }
}

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] duckdb::Error),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Schema descriptor error: {0}")]
  Descriptor(String),

  #[error("Schema drift: {}", render_mismatches(.0))]
  Drift(Vec<SchemaMismatch>),

  #[error("Corrupt row: {0}")]
  Corrupt(String),
}

fn render_mismatches(mismatches: &[SchemaMismatch]) -> String {
  mismatches.iter().map(|m| m.to_string()).collect::<Vec<_>>().join("; ")
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mismatch_display_missing() {
    let mismatch = SchemaMismatch::MissingColumn { name: "url".to_string() };
    assert_eq!(mismatch.to_string(), "missing column 'url'");
  }

  #[test]
  fn test_mismatch_display_unexpected() {
    let mismatch = SchemaMismatch::UnexpectedColumn { name: "legacy_flag".to_string() };
    assert_eq!(mismatch.to_string(), "unexpected column 'legacy_flag'");
  }

  #[test]
  fn test_mismatch_display_type() {
    let mismatch = SchemaMismatch::TypeMismatch {
      column: "trade_count".to_string(),
      expected: "BIGINT".to_string(),
      actual: "VARCHAR".to_string(),
    };
    assert_eq!(mismatch.to_string(), "column 'trade_count' is VARCHAR, expected BIGINT");
  }

  #[test]
  fn test_drift_display_joins_mismatches() {
    let err = StoreError::Drift(vec![
      SchemaMismatch::UnexpectedColumn { name: "legacy_flag".to_string() },
      SchemaMismatch::CountMismatch { expected: 17, actual: 18 },
    ]);
    let text = err.to_string();
    assert!(text.contains("legacy_flag"));
    assert!(text.contains("18 columns, expected 17"));
  }

  #[test]
  fn test_descriptor_display() {
    let err = StoreError::Descriptor("manifest missing".to_string());
    assert_eq!(err.to_string(), "Schema descriptor error: manifest missing");
  }
}
