//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Migrate a Zim notebook into a markdown vault
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: zimvault.toml, read only if present)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Migrate the notebook, writing the vault
    #[command(visible_alias = "m")]
    Migrate {
        #[command(flatten)]
        paths: PathArgs,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Write into a vault directory that is not empty
        #[arg(long)]
        force: bool,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },

    /// Build and report the vault map without writing the vault
    #[command(visible_alias = "p")]
    Plan {
        #[command(flatten)]
        paths: PathArgs,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },
}

/// Notebook and vault locations.
#[derive(clap::Args, Debug, Clone)]
pub struct PathArgs {
    /// Notebook root directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Vault root directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub destination: Option<PathBuf>,

    /// Write folder/page/attachment maps as JSON into this directory
    #[arg(short = 'D', long, value_hint = clap::ValueHint::DirPath)]
    pub dump_maps: Option<PathBuf>,
}

/// Layout policy overrides.
#[derive(clap::Args, Debug, Clone)]
pub struct PolicyArgs {
    /// Move a page into its same-named folder as the folder note
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub folder_notes: Option<bool>,

    /// Collect all attachments into one directory
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub global_attachments: Option<bool>,

    /// Attachment directory (relative to the vault root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub attachment_dir: Option<PathBuf>,

    /// File extensions to skip (comma-separated, leading dot optional)
    #[arg(short, long, value_delimiter = ',')]
    pub ignore_ext: Option<Vec<String>>,
}

impl Cli {
    /// Whether the command writes the vault.
    pub const fn writes_vault(&self) -> bool {
        matches!(self.command, Commands::Migrate { .. })
    }

    pub const fn is_verbose(&self) -> bool {
        match self.command {
            Commands::Migrate { verbose, .. } | Commands::Plan { verbose, .. } => verbose,
        }
    }
}
