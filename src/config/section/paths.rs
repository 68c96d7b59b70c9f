//! `[paths]` section configuration.

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::normalize_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Notebook root (the directory holding `notebook.zim`).
    pub source: PathBuf,

    /// Vault root, created if missing.
    pub destination: PathBuf,

    /// Directory for the JSON map dumps, off when unset.
    pub dump_maps: Option<PathBuf>,
}

impl PathsConfig {
    pub const SOURCE: FieldPath = FieldPath("paths.source");
    pub const DESTINATION: FieldPath = FieldPath("paths.destination");

    /// Resolve every set path against `base` with tilde expansion.
    ///
    /// Empty paths stay empty so validation can report them as missing.
    pub fn normalize(&mut self, base: &Path) {
        self.source = resolve_path(&self.source, base);
        self.destination = resolve_path(&self.destination, base);
        if let Some(dir) = self.dump_maps.take() {
            self.dump_maps = Some(resolve_path(&dir, base));
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.source.as_os_str().is_empty() {
            diag.error_with_hint(
                Self::SOURCE,
                "notebook root is required",
                "pass it as the first argument or set `source` in [paths]",
            );
        } else if !self.source.is_dir() {
            diag.error(
                Self::SOURCE,
                format!("`{}` is not a directory", self.source.display()),
            );
        }

        if self.destination.as_os_str().is_empty() {
            diag.error_with_hint(
                Self::DESTINATION,
                "vault root is required",
                "pass it as the second argument or set `destination` in [paths]",
            );
        } else if !self.source.as_os_str().is_empty()
            && self.destination.starts_with(&self.source)
        {
            diag.error(
                Self::DESTINATION,
                format!(
                    "`{}` lies inside the notebook `{}`",
                    self.destination.display(),
                    self.source.display()
                ),
            );
        }
    }
}

/// Tilde-expand `path` and make it absolute against `base`.
fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return PathBuf::new();
    }
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    let full_path = if expanded.is_relative() {
        base.join(expanded)
    } else {
        expanded
    };
    normalize_path(&full_path)
}
