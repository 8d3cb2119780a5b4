use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pagecatch_app::{app, logging, AppConfig};

/// Watch configured pages and report what was added since the last run.
#[derive(Debug, Parser)]
#[command(name = "pagecatch", version, about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Write the report to the mail log instead of sending it.
    #[arg(short = 'n', long)]
    no_mail: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    app::prepare_dirs(&config)?;
    logging::initialize(&config.log_dir, config.debug);

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(app::run(&config, &cli.config, !cli.no_mail))?;
    Ok(())
}
