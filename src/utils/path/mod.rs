//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `relative_slash`)
//! - [`name`]: File name helpers (`split_ext`, `has_ext`)

pub mod fs;
pub mod name;

pub use fs::{normalize_path, relative_slash, to_slash};
pub use name::{has_ext, split_ext};
