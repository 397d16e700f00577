//! Stencil — fill HTML templates from JSON.
//!
//! # Usage
//!
//! ```text
//! stencil render <page> --data <file|-> --target <selector> --template <selector> [--ndjson]
//! stencil bootstrap <page> [--base-dir <dir>]
//! stencil inspect <page> [--json]
//! ```
//!
//! `render` and `bootstrap` accept `--config <file>` and `--output <file>`;
//! without `--output` the filled page goes to stdout.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{bootstrap::BootstrapArgs, inspect::InspectArgs, render::RenderArgs};
use stencil_runtime::{init_tracing, LogFormat};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stencil",
    version,
    about = "Fill logic-free HTML templates from JSON records",
    long_about = None,
)]
struct Cli {
    /// Emit log events as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill one template into one target, once per record.
    Render(RenderArgs),

    /// Fill every `[data-source]` element of a page from its JSON source.
    Bootstrap(BootstrapArgs),

    /// List a page's templates, bindings and data sources.
    Inspect(InspectArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_tracing("warn", format);

    match cli.command {
        Commands::Render(args) => args.run(),
        Commands::Bootstrap(args) => args.run(),
        Commands::Inspect(args) => args.run(),
    }
}
