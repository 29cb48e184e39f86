//! TesseraDB interactive shell.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod formatter;
mod repl;

use config::CliConfig;
use formatter::{format_view, OutputFormat};
use repl::Repl;

/// TesseraDB interactive shell.
#[derive(Debug, ClapParser)]
#[command(name = "tessera", version, about)]
struct Args {
    /// Execute one statement and exit.
    #[arg(short = 'c', long = "command")]
    command: Option<String>,

    /// Configuration file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: table, json, csv, raw.
    #[arg(short = 'F', long)]
    format: Option<String>,

    /// Tracing filter, e.g. `tessera_engine=debug`.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => CliConfig::from_file(path)?,
        None => CliConfig::load_default()?,
    };

    init_tracing(args.log.as_deref().or(config.log_filter.as_deref()));

    let format_name = args.format.as_deref().unwrap_or(&config.output_format);
    let format = OutputFormat::from_name(format_name)
        .ok_or_else(|| anyhow!("unknown output format: {}", format_name))?;

    match args.command {
        Some(statement) => run_once(&statement, format),
        None => Repl::new(config, format).run(),
    }
}

/// Executes a single statement against a fresh engine.
fn run_once(statement: &str, format: OutputFormat) -> Result<()> {
    let engine = tessera_engine::Engine::new();
    match engine.execute(statement)? {
        Some(view) => println!("{}", format_view(&view, format).trim_end()),
        None => println!("ok"),
    }
    Ok(())
}

/// Initializes the tracing subscriber from an explicit filter, falling
/// back to `RUST_LOG`.
fn init_tracing(filter: Option<&str>) {
    let env_filter = match filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
