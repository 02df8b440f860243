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

use bfa_client::HttpClient;
use bfa_core::Config;
use bfa_pipeline::run_checks;
use bfa_store::{load_descriptor, AvailabilityStore};

#[derive(Args, Debug)]
pub struct ValidateArgs {
  /// Skip the live cross-check even when the metadata endpoint is reachable
  #[arg(long)]
  offline: bool,
}

/// Run the schema guard and the three validators against an existing store,
/// without probing anything. Findings are printed and do not fail the
/// invocation; schema drift does.
pub async fn execute(args: ValidateArgs, config: Config) -> Result<()> {
  let store = AvailabilityStore::open_read_only(&config.db_path)?;
  store.check_schema(&load_descriptor(&config.schema_path)?)?;
  println!("schema: ok ({} rows)", store.row_count()?);

  let offline_error =
    bfa_core::Error::Config("cross-check disabled by --offline".to_string());
  let live = if args.offline {
    Err(offline_error)
  } else {
    let client = HttpClient::new(&config).await?;
    client.fetch_live_symbols().await
  };

  let report =
    run_checks(&store, live.as_ref(), config.completeness_min, config.completeness_max)?;

  if report.is_clean() {
    println!("validation: clean");
  } else {
    for finding in &report.findings {
      println!("finding: {finding}");
    }
  }

  Ok(())
}
