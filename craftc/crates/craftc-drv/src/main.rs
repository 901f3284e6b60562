//! The `craftc` command-line interface.
//!
//! Two positional arguments, no flags: the source file and the output
//! directory. Exit code 0 on success, nonzero on any parse or compile
//! error. Log verbosity is controlled through the `CRAFTC_LOG` environment
//! variable (`tracing_subscriber::EnvFilter` syntax).

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compiles a CraftLang source file to a Minecraft datapack.
#[derive(Parser, Debug)]
#[command(name = "craftc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles CraftLang sources to Minecraft datapacks", long_about = None)]
struct Cli {
    /// The CraftLang source file to compile
    source: PathBuf,

    /// The output datapack directory
    destination: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    craftc_drv::compile_path(&cli.source, &cli.destination)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("CRAFTC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
