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

//! # bfa-store
//!
//! Single-file embedded columnar store (DuckDB) holding the primary
//! `daily_availability` table and the derived `daily_symbol_counts` table,
//! plus the schema-drift guard and the rankings materializer.
//!
//! The store is opened exclusively by the pipeline driver for the duration of
//! a run; readers may attach the file concurrently in read-only mode and
//! accept it as a point-in-time snapshot.

pub mod error;
pub mod guard;
pub mod models;
pub mod rankings;
pub mod schema;
pub mod store;

pub use error::{SchemaMismatch, StoreError, StoreResult};
pub use guard::verify_columns;
pub use models::{AvailabilityRow, KlineAggregates};
pub use rankings::{materialize_rankings, RankedRow};
pub use schema::{canonical_columns, load_descriptor, ColumnDescriptor, COUNTS_TABLE, PRIMARY_TABLE};
pub use store::{open_checked, AvailabilityStore};
