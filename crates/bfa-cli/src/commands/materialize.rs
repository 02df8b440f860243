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

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use bfa_core::Config;
use bfa_store::{load_descriptor, materialize_rankings, AvailabilityStore};

#[derive(Args, Debug)]
pub struct MaterializeArgs {
  /// Output path for the rankings artifact (defaults to BFA_RANKINGS_PATH)
  #[arg(long)]
  out: Option<PathBuf>,
}

/// Rebuild the rankings artifact from the store. The artifact is a pure
/// projection of the primary table, so rebuilding is always safe.
pub async fn execute(args: MaterializeArgs, config: Config) -> Result<()> {
  let out = args.out.unwrap_or_else(|| config.rankings_path.clone());

  let store = AvailabilityStore::open(&config.db_path)?;
  store.check_schema(&load_descriptor(&config.schema_path)?)?;

  let rows = materialize_rankings(&store, &out)?;
  println!("rankings artifact: {rows} row(s) -> {}", out.display());

  Ok(())
}
