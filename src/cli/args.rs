//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    clear::ClearArgs, completions::CompletionsArgs, init::InitArgs, list::ListCommands,
    update::UpdateArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "nutriswap")]
#[command(author, version, about = "Find healthier food substitutes from your terminal")]
#[command(
    long_about = "Nutriswap pulls product data from OpenFoodFacts into a local database and \
lets you browse categories, find healthier substitutes and keep favorites."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format for list commands
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Database file (default: the platform data directory)
    #[arg(long, global = true, env = "NUTRISWAP_DB")]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and ingest the food data
    Init(InitArgs),

    /// Browse categories and find substitutes interactively
    Browse,

    /// Browse and manage saved favorites interactively
    Favorites,

    /// Non-interactive listings (pipeable)
    #[command(subcommand)]
    List(ListCommands),

    /// Re-download everything, replacing the database
    Update(UpdateArgs),

    /// Delete all saved favorites
    Clear(ClearArgs),

    /// Show database statistics
    Status,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically pick tsv, honoring the configured default
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}

impl OutputFormat {
    /// Resolve `Auto` against the configured default.
    pub fn resolve(self, config: &Config) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        match config.default_format.as_deref() {
            Some("csv") => OutputFormat::Csv,
            Some("md") => OutputFormat::Md,
            _ => OutputFormat::Tsv,
        }
    }
}
