//! Command-line front end for the `json-bind` codec: parse/validate a
//! document, re-emit it as canonical JSON, or list the registered
//! adapters. `tracing_subscriber`'s `EnvFilter`-driven `fmt` subscriber
//! provides the binary-level logging surface the core library itself
//! deliberately carries none of.

use std::io::{IsTerminal, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "json-bind")]
#[command(about = "Parse, validate and canonicalize JSON text", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace). Falls back to `RUST_LOG`.
    #[arg(long, global = true)]
    log_level: Option<tracing::Level>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and fail with a positional diagnostic on error.
    Check(FileArgs),

    /// Parse a document and re-emit it as canonical compact JSON.
    Format(FileArgs),

    /// List the adapters registered for temporal and protobuf types.
    Adapters,
}

#[derive(clap::Args)]
struct FileArgs {
    /// Path to read, or `-` for stdin.
    #[arg(default_value = "-")]
    path: PathBuf,
}

fn init_tracing(log_level: Option<tracing::Level>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::builder()
            .with_default_directive(tracing::Level::WARN.into())
            .from_env_lossy(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.command {
        Commands::Check(args) => {
            let text = read_input(&args.path)?;
            tracing::debug!(bytes = text.len(), "parsing document");
            json_bind::Parser::parse(&text)?;
            println!("ok");
            Ok(())
        }
        Commands::Format(args) => {
            let text = read_input(&args.path)?;
            tracing::debug!(bytes = text.len(), "parsing document");
            let value = json_bind::Parser::parse(&text)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", value.to_compact_string())?;
            Ok(())
        }
        Commands::Adapters => {
            let mut names = json_bind::adapters::global().names();
            names.sort_unstable();
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
    }
}
