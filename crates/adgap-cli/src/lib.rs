//! Subscription gap-analysis CLI library.
//!
//! This crate provides the outer layer around `adgap-core`: argument
//! parsing, configuration, CSV loading/writing and the subcommands.

mod cli;
pub mod commands;
mod config;
pub mod loader;
pub mod tables;

pub use cli::{Cli, Commands};
pub use config::Config;
