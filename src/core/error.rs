//! Migration error and warning types.
//!
//! Fatal conditions are [`ErrorKind`] values wrapped in a [`MigrateError`]
//! that records the page and line. Recoverable conditions are [`Warning`]s,
//! collected per page in [`Diagnostics`] and reported after translation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use thiserror::Error;

/// Fatal conditions: any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// An internal reference written as an absolute path into the notebook.
    #[error("absolute path `{}` points inside the notebook, link it relatively instead", .0.display())]
    MisclassifiedAbsolutePath(PathBuf),

    /// A `./name` reference without a matching attachment.
    #[error("attachment `{}` is not part of the notebook", .0.display())]
    MissingAttachment(PathBuf),

    #[error("IO error when reading `{}`: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
}

/// A fatal error located in a page.
// NOTE: `kind` is not a #[source] - its message is already part of ours
#[derive(Debug, Error)]
#[error("{}{}: {kind}", .page.display(), .line.map(|l| format!(":{l}")).unwrap_or_default())]
pub struct MigrateError {
    /// Source page (relative to the notebook root when known)
    pub page: PathBuf,
    /// 1-based line number, if the error came from a line
    pub line: Option<usize>,
    pub kind: ErrorKind,
}

impl MigrateError {
    pub fn new(page: impl Into<PathBuf>, line: Option<usize>, kind: ErrorKind) -> Self {
        Self {
            page: page.into(),
            line,
            kind,
        }
    }
}

/// Recoverable conditions: logged, output is best effort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("unresolved link `{0}`, kept as is")]
    UnresolvedLink(String),

    #[error("cannot read size of image `{}` ({reason}), size dropped", .path.display())]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("cannot size image for `{0}`, size dropped")]
    UnsizedEmbed(String),

    #[error("unknown embed option `{0}`, ignored")]
    UnknownEmbedOption(String),

    #[error("invalid value `{value}` for embed option `{key}`, ignored")]
    InvalidEmbedOption { key: String, value: String },

    #[error("code block is never closed, treating the rest of the page as code")]
    UnterminatedFence,
}

/// A warning with the 1-based line it was raised on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWarning {
    pub line: usize,
    pub warning: Warning,
}

/// Per-page warning collector.
///
/// The transformer sets the current line before running rules so that
/// rules only have to report *what* went wrong.
#[derive(Debug, Default)]
pub struct Diagnostics {
    line: AtomicUsize,
    warnings: Mutex<Vec<LineWarning>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the 1-based line subsequent warnings belong to.
    pub fn set_line(&self, line: usize) {
        self.line.store(line, Ordering::Relaxed);
    }

    pub fn line(&self) -> usize {
        self.line.load(Ordering::Relaxed)
    }

    pub fn warn(&self, warning: Warning) {
        self.warnings.lock().push(LineWarning {
            line: self.line(),
            warning,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.lock().is_empty()
    }

    /// Take all collected warnings, leaving the collector empty.
    pub fn drain(&self) -> Vec<LineWarning> {
        std::mem::take(&mut *self.warnings.lock())
    }
}
