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

pub mod backfill;
pub mod daily;
pub mod materialize;
pub mod validate;

use anyhow::{anyhow, Result};
use bfa_core::Symbol;
use bfa_pipeline::RunSummary;

/// Parse a comma-separated symbol subset from the CLI.
pub fn parse_symbols(raw: &Option<Vec<String>>) -> Result<Option<Vec<Symbol>>> {
  let Some(raw) = raw else {
    return Ok(None);
  };
  let mut symbols = Vec::with_capacity(raw.len());
  for entry in raw {
    symbols.push(Symbol::parse(entry)?);
  }
  Ok(Some(symbols))
}

/// Print the run's publication metadata and convert the outcome into the
/// process exit discipline: nonzero iff the run never reached MATERIALIZE.
/// Validator findings are reported but never fail the invocation.
pub fn finish_run(summary: RunSummary) -> Result<()> {
  println!(
    "dates committed: {} | rows written: {} | aggregates applied: {}",
    summary.dates_committed.len(),
    summary.rows_written,
    summary.aggregates_applied
  );
  if !summary.discovered.is_empty() {
    let names: Vec<&str> = summary.discovered.iter().map(|s| s.as_str()).collect();
    println!(
      "discovered {} new symbol(s): {} ({} backfilled rows)",
      summary.discovered.len(),
      names.join(", "),
      summary.backfilled_rows
    );
  }
  for finding in &summary.findings {
    println!("finding: {finding}");
  }
  if let Some(rows) = summary.rankings_rows {
    println!("rankings artifact: {rows} row(s)");
  }

  if summary.succeeded() {
    return Ok(());
  }

  for (date, cause) in &summary.dates_failed {
    eprintln!("hard-failed {date}: {cause}");
  }
  Err(anyhow!("{} date(s) hard-failed; nothing was published", summary.dates_failed.len()))
}
