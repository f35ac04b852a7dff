//! ferrite-mentions - Main Entry Point
//!
//! Reads a markup value from stdin and prints one of its derived views,
//! using the mention settings from the config directory (or `--config`).

use clap::{Parser, Subcommand};
use ferrite_mentions::config::{load_settings, load_settings_from};
use ferrite_mentions::markup::{map_plain_text_index, DerivedViews, MarkupCorrection};
use ferrite_mentions::mentions::classify_selection;
use log::{debug, error, info};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

/// Application name constant.
const APP_NAME: &str = "ferrite-mentions";

/// Prints derived views of mention markup read from stdin.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "ferrite-mentions", version, about)]
struct Args {
    /// Settings file to use instead of the one in the config directory
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print the plain text
    Plain,
    /// Print the text with mentions replaced by their ids
    Ids,
    /// Print the mentions as JSON
    Mentions,
    /// Print the markup offsets of a plain-text offset as JSON
    Map { index: usize },
    /// Print how a selection touches each mention as JSON
    Classify { start: usize, end: usize },
}

fn run(args: Args, markup: &str) -> ferrite_mentions::Result<String> {
    let settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    let configs = settings.to_configs()?;
    debug!("Using {} mention dialect(s)", configs.len());

    let views = DerivedViews::build(markup, &configs);
    let output = match args.command {
        Command::Plain => views.plain_text,
        Command::Ids => views.id_text,
        Command::Mentions => serde_json::to_string_pretty(&views.mentions)?,
        Command::Map { index } => {
            let map = |correction| map_plain_text_index(markup, &configs, index, correction);
            serde_json::to_string_pretty(&serde_json::json!({
                "start": map(MarkupCorrection::Start),
                "end": map(MarkupCorrection::End),
                "null": map(MarkupCorrection::Null),
            }))?
        }
        Command::Classify { start, end } => {
            serde_json::to_string_pretty(&classify_selection(start, end, &views.mentions))?
        }
    };
    Ok(output)
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Starting {} ({:?})", APP_NAME, args.command);

    let mut markup = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut markup) {
        error!("Failed to read markup from stdin: {}", e);
        return ExitCode::FAILURE;
    }
    // A trailing newline from the shell is not part of the value
    let markup = markup.strip_suffix('\n').unwrap_or(&markup);

    match run(args, markup) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
