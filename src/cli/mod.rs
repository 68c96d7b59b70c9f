//! Command-line interface module.

mod args;
pub mod migrate;
pub mod plan;

pub use args::{Cli, Commands, PolicyArgs};
