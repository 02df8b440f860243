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
use tracing::info;

use crate::commands::{finish_run, parse_symbols};
use bfa_core::Config;
use bfa_pipeline::{PipelineDriver, RunMode, RunOptions};

#[derive(Args, Debug)]
pub struct DailyArgs {
  /// Rolling lookback window in days
  #[arg(long, env = "BFA_LOOKBACK_DAYS")]
  lookback: Option<u32>,

  /// Worker-pool size for the batch prober
  #[arg(long, env = "BFA_WORKERS")]
  workers: Option<usize>,

  /// Restrict probing to a comma-separated symbol subset
  #[arg(long, value_delimiter = ',')]
  symbols: Option<Vec<String>>,

  /// Disable the progress bar
  #[arg(long)]
  no_progress: bool,
}

pub async fn execute(args: DailyArgs, mut config: Config) -> Result<()> {
  if let Some(lookback) = args.lookback {
    config.lookback_days = lookback;
  }
  if let Some(workers) = args.workers {
    config.workers = workers;
  }
  let symbols = parse_symbols(&args.symbols)?;

  info!(
    lookback = config.lookback_days,
    workers = config.workers,
    "starting daily availability run"
  );

  let driver = PipelineDriver::new(config).await?;
  let summary = driver
    .run(RunOptions { mode: RunMode::Daily, symbols, show_progress: !args.no_progress })
    .await?;

  finish_run(summary)
}
