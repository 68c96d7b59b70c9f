//! Core types - pure abstractions shared across the codebase.

mod error;
mod kind;
mod link;
mod token;

pub use error::{Diagnostics, ErrorKind, LineWarning, MigrateError, Warning};
pub use kind::{
    EntryKind, MARKDOWN_EXTENSION, PAGE_EXTENSION, file_has_page_signature, text_has_page_signature,
};
pub use link::{TargetKind, WIKIPEDIA_BASE, strip_relative_marker};
pub use token::{EmbedToken, LinkToken};
