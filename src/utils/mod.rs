//! Utility modules.

pub mod date;
pub mod path;
mod plural;

pub use plural::plural_count;
