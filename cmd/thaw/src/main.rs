//! thaw-config - Load a frozen configuration and print it.

use std::path::PathBuf;

use cfgfreeze_bootstrap::thaw;
use cfgfreeze_cli::{Output, OutputFormat, init_logging};
use clap::Parser;
use tracing::debug;

/// thaw-config - Load a frozen configuration and print it.
///
/// Reads a bootstrap file written by freeze-config (descriptor or legacy
/// Python form), loads the artifact it names, applies its mutations and
/// prints the result. Shared objects and cycles are printed as `!ref` paths.
#[derive(Parser)]
#[command(name = "thaw-config")]
#[command(about = "Load a frozen configuration through its bootstrap file")]
#[command(version)]
struct Cli {
    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long)]
    json: bool,

    /// Name the configuration is printed under
    #[arg(long, default_value = "process")]
    root_name: String,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Bootstrap file
    bootstrap: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let graph = thaw(&cli.bootstrap)?;
    debug!(objects = graph.len(), "configuration thawed");

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    let doc = graph.to_yaml_module(&cli.root_name)?;
    Output::new(format, cli.output).write(&doc)?;
    Ok(())
}
