mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use binsniff_core::{sniff, Binary, BinaryKind, DecodeError};
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Executable format sniffer and header dumper
#[derive(Parser)]
#[command(
    name = "binsniff",
    about = "Identify ELF/PE executables and list their header fields and sections",
    version,
    author
)]
struct Cli {
    /// Path to binary file
    #[arg(required_unless_present = "self_exe")]
    path: Option<PathBuf>,

    /// Analyze the running binsniff executable itself
    #[arg(long = "self", conflicts_with = "path")]
    self_exe: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log decoding steps (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Show only the detected format
    Kind,
    /// Show file header metadata
    Header,
    /// List all sections
    Sections,
    /// Header metadata followed by sections (default)
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn target(cli: &Cli) -> Result<PathBuf> {
    let path = match &cli.path {
        Some(path) => path.clone(),
        None => std::env::current_exe().context("cannot resolve own executable path")?,
    };
    log::debug!("analyzing {}", path.display());
    Ok(path)
}

/// Runs the selected command and returns what it prints on success.
fn run(cli: &Cli) -> Result<String> {
    let path = target(cli)?;

    match cli.command.unwrap_or(Command::All) {
        Command::Kind => {
            let kind = sniff(&path)?;
            if kind == BinaryKind::Unknown {
                return Err(DecodeError::UnsupportedFormat("not an ELF or PE executable").into());
            }
            if cli.json {
                Ok(format!("{}\n", render::kind_json(&path, kind)?))
            } else {
                Ok(format!("{kind}\n"))
            }
        }
        Command::Header => analyze(cli, &path, render::header_text),
        Command::Sections => analyze(cli, &path, render::sections_text),
        Command::All => analyze(cli, &path, |bin| {
            format!(
                "{}\n{}",
                render::header_text(bin),
                render::sections_text(bin)
            )
        }),
    }
}

/// Decodes `path` and renders it as JSON, or as text through `body`.
fn analyze(cli: &Cli, path: &Path, body: impl FnOnce(&Binary) -> String) -> Result<String> {
    let bin = Binary::open(path)?;
    if cli.json {
        return Ok(format!("{}\n", render::binary_json(path, &bin)?));
    }
    Ok(format!("Analyzing: {}\n{}", path.display(), body(&bin)))
}
