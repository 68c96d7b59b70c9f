//! Migration configuration management for `zimvault.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths]
//! │   └── policy     # [policy]
//! ├── error          # ConfigError, ConfigDiagnostics
//! └── mod.rs         # MigrateConfig (this file)
//! ```
//!
//! The config file is optional: every value can come from the command line,
//! and command-line values win over the file.

mod error;
pub mod section;

pub use error::{ConfigDiagnostics, ConfigError, FieldPath};
pub use section::{PathsConfig, Policy};

use crate::{
    cli::{Cli, Commands, PolicyArgs},
    debug, log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "zimvault.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing zimvault.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// Absolute path to the config file, if one was read (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Write into a non-empty vault (internal use only)
    #[serde(skip)]
    pub force: bool,

    /// Notebook and vault locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Layout policy
    #[serde(default)]
    pub policy: Policy,
}

impl MigrateConfig {
    /// Load configuration from the optional config file and CLI arguments.
    ///
    /// Paths in the file are relative to the file's directory, paths on the
    /// command line are relative to the working directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match Self::resolve_config_path(cli, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                let root = path.parent().unwrap_or(cwd.as_path()).to_path_buf();
                config.paths.normalize(&root);
                config.config_path = Some(normalize_path(&path));
                config
            }
            None => Self::default(),
        };

        if let Some(path) = &config.config_path {
            debug!("config"; "using {}", path.display());
        }

        config.apply_command_options(cli, &cwd);
        config.validate(cli.writes_vault())?;
        Ok(config)
    }

    /// Explicit `--config` is always read (and fails if missing); the default
    /// file is only read when present.
    fn resolve_config_path(cli: &Cli, cwd: &Path) -> Option<PathBuf> {
        match &cli.config {
            Some(path) => Some(cwd.join(path)),
            None => {
                let path = cwd.join(DEFAULT_CONFIG);
                path.is_file().then_some(path)
            }
        }
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content).map_err(ConfigError::Toml)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Notebook root (absolute).
    pub fn source_root(&self) -> &Path {
        &self.paths.source
    }

    /// Vault root (absolute).
    pub fn destination_root(&self) -> &Path {
        &self.paths.destination
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli, cwd: &Path) {
        let (paths, policy) = match &cli.command {
            Commands::Migrate {
                paths,
                policy,
                force,
                ..
            } => {
                self.force = *force;
                (paths, policy)
            }
            Commands::Plan { paths, policy, .. } => (paths, policy),
        };

        let mut overrides = PathsConfig {
            source: paths.source.clone().unwrap_or_default(),
            destination: paths.destination.clone().unwrap_or_default(),
            dump_maps: paths.dump_maps.clone(),
        };
        overrides.normalize(cwd);

        if !overrides.source.as_os_str().is_empty() {
            self.paths.source = overrides.source;
        }
        if !overrides.destination.as_os_str().is_empty() {
            self.paths.destination = overrides.destination;
        }
        if overrides.dump_maps.is_some() {
            self.paths.dump_maps = overrides.dump_maps;
        }

        self.apply_policy_args(policy);
    }

    /// Apply layout policy arguments from CLI.
    fn apply_policy_args(&mut self, args: &PolicyArgs) {
        Self::update_option(&mut self.policy.folder_notes, args.folder_notes.as_ref());
        Self::update_option(
            &mut self.policy.global_attachments,
            args.global_attachments.as_ref(),
        );
        Self::update_option(&mut self.policy.attachment_dir, args.attachment_dir.as_ref());
        Self::update_option(&mut self.policy.ignore_extensions, args.ignore_ext.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors at once.
    ///
    /// `writes_vault` adds the checks that only matter when the vault is
    /// actually written.
    pub fn validate(&self, writes_vault: bool) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.paths.validate(&mut diag);
        self.policy.validate(&mut diag);

        if writes_vault && !self.force && !is_empty_dir(self.destination_root()) {
            diag.error_with_hint(
                PathsConfig::DESTINATION,
                format!(
                    "`{}` already exists and is not empty",
                    self.destination_root().display()
                ),
                "pass --force to write into it anyway",
            );
        }

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

/// Missing directories count as empty.
fn is_empty_dir(path: &Path) -> bool {
    match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => !path.exists(),
    }
}

// ============================================================================
// tests
// ============================================================================
