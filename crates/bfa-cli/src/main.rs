

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use bfa_core::Config;

mod commands;
use commands::{backfill, daily, materialize, validate};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bfa")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Probe the rolling lookback window and refresh the store
  Daily(daily::DailyArgs),

  /// Probe or bulk-list an explicit historical date range
  Backfill(backfill::BackfillArgs),

  /// Run the schema guard and validators against an existing store
  Validate(validate::ValidateArgs),

  /// Rebuild the rankings artifact from an existing store
  Materialize(materialize::MaterializeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  // Parse CLI arguments
  let cli = Cli::parse();

  // Initialize logging
  let log_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt().with_env_filter(log_level).init();

  // Load configuration
  let config = Config::from_env()?;

  // Execute command
  match cli.command {
    Commands::Daily(args) => daily::execute(args, config).await?,
    Commands::Backfill(args) => backfill::execute(args, config).await?,
    Commands::Validate(args) => validate::execute(args, config).await?,
    Commands::Materialize(args) => materialize::execute(args, config).await?,
  }

  Ok(())
}
