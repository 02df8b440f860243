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

//! Schema-drift guard: the live column list against the canonical descriptor.
//!
//! Runs as the very first check of a pipeline invocation; any mismatch is
//! terminal before a single row is touched. Nullability differences are
//! reported as type mismatches (the rendered type carries the NULL clause).

use crate::error::SchemaMismatch;
use crate::schema::ColumnDescriptor;

fn rendered_type(column: &ColumnDescriptor) -> String {
  if column.nullable {
    column.data_type.clone()
  } else {
    format!("{} NOT NULL", column.data_type)
  }
}

/// Compare the live column list against the canonical one. Empty result
/// means no drift. Order of findings: count first, then per-column problems
/// in canonical order, then unexpected live columns.
pub fn verify_columns(
  expected: &[ColumnDescriptor],
  live: &[ColumnDescriptor],
) -> Vec<SchemaMismatch> {
  let mut mismatches = Vec::new();

  if expected.len() != live.len() {
    mismatches.push(SchemaMismatch::CountMismatch {
      expected: expected.len(),
      actual: live.len(),
    });
  }

  for column in expected {
    match live.iter().find(|candidate| candidate.name == column.name) {
      None => mismatches.push(SchemaMismatch::MissingColumn { name: column.name.clone() }),
      Some(actual) => {
        if actual.data_type != column.data_type || actual.nullable != column.nullable {
          mismatches.push(SchemaMismatch::TypeMismatch {
            column: column.name.clone(),
            expected: rendered_type(column),
            actual: rendered_type(actual),
          });
        }
      }
    }
  }

  for column in live {
    if !expected.iter().any(|candidate| candidate.name == column.name) {
      mismatches.push(SchemaMismatch::UnexpectedColumn { name: column.name.clone() });
    }
  }

  mismatches
}
