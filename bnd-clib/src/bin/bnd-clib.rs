//! CLI entry point for bnd-clib.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// bnd-clib — generate a flat C library from an API description.
#[derive(Parser, Debug)]
#[command(name = "bnd-clib", version, about)]
struct Cli {
    /// Path to the bnd-clib.toml configuration file.
    #[arg(default_value = "bnd-clib.toml")]
    config: PathBuf,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bnd_clib=info")),
        )
        .init();

    let cli = Cli::parse();
    bnd_clib::run(&cli.config, cli.output.as_deref())?;
    Ok(())
}
