//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser};

/// Live popularity ranking fed by newline-delimited JSON actions on stdin.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// TOML file with `[ranking]` settings and `[[content]]` seed records.
    #[arg(short, long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Leaderboard size (overrides `ranking.top_n`).
    #[arg(short = 'n', long, value_name = "N")]
    pub(crate) top: Option<usize>,

    /// Print the final leaderboard as JSON.
    #[arg(long)]
    pub(crate) json: bool,

    #[command(flatten)]
    pub(crate) logs: LogArgs,
}

/// Logging configuration.
#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "Logging")]
pub(crate) struct LogArgs {
    /// Silence all output except errors.
    #[arg(short, long)]
    pub(crate) quiet: bool,

    /// Verbose mode (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub(crate) verbosity: u8,

    /// Log filter directive (e.g., "popularity_ranking=trace").
    #[arg(long = "log.filter", value_name = "DIRECTIVE")]
    pub(crate) filter: Option<String>,
}
