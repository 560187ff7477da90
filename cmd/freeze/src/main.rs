//! freeze-config - Freeze a configuration source for batch jobs.

use std::path::PathBuf;

use anyhow::Context as _;
use cfgfreeze_bootstrap::EmitFormat;
use cfgfreeze_cli::{init_logging, load_settings};
use cfgfreeze_freezer::{FreezeOptions, freeze};
use clap::Parser;
use tracing::debug;

const APP_NAME: &str = "freeze-config";

/// freeze-config - Freeze a configuration source for batch jobs.
///
/// Evaluates <config file>, takes its `process` attribute and writes two
/// files: the bootstrap at <output file> and the artifact at
/// <output file>.pkl. Both must be shipped with the job.
///
/// Settings are read from ~/.cfgfreeze/freeze-config/config.yaml when present.
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(about = "Freeze a configuration source into a bootstrap file and artifact")]
#[command(version)]
struct Cli {
    /// Bootstrap format (descriptor or python)
    #[arg(long)]
    emit: Option<EmitFormat>,

    /// Settings file (default is ~/.cfgfreeze/freeze-config/config.yaml)
    #[arg(long)]
    config: Option<String>,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// <config file> <output file>
    #[arg(value_name = "FILE")]
    args: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // A wrong count only prints usage; missing arguments fail below.
    if cli.args.len() != 2 {
        println!("Usage: {APP_NAME} <config file> <output file>");
    }
    let config_path = cli.args.first().context("missing <config file> argument")?;
    let output_path = cli.args.get(1).context("missing <output file> argument")?;

    let settings = load_settings(APP_NAME, cli.config.as_deref())?;
    debug!(settings = %settings.path().display(), "settings loaded");

    let opts = FreezeOptions {
        emit: cli.emit.unwrap_or(settings.emit),
        framework: settings.framework(),
    };
    freeze(config_path, output_path, &opts)?;
    Ok(())
}
