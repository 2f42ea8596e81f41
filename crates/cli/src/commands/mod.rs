//! Subcommand implementations.

pub mod content;
pub mod migrate;
