//! CLI subcommand implementations.

pub mod config;
pub mod recipients;
pub mod recruit;
pub mod telegram;
