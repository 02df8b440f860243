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

//! # bfa-pipeline
//!
//! Orchestration for the availability pipeline: the bounded-concurrency batch
//! prober, the durable symbol catalog, gap detection and repair, the
//! non-fatal validator, and the single-shot run driver.
//!
//! The driver is a strict DAG per invocation:
//! discover -> gap repair -> rolling probes -> kline enrichment -> validate ->
//! materialize. The only back-edge is operational: the next scheduled run's
//! overlapping lookback repairs whatever this one could not commit.

pub mod batch_prober;
pub mod catalog;
pub mod driver;
pub mod error;
pub mod gap_detector;
pub mod validator;

pub use batch_prober::{probe_batch, BatchOutcome, ProbeFailure};
pub use catalog::SymbolCatalog;
pub use driver::{PipelineDriver, RunMode, RunOptions, RunSummary};
pub use error::{PipelineError, PipelineResult};
pub use gap_detector::detect_gaps;
pub use validator::{run_checks, CheckKind, Finding, ValidationReport};
