//! Contribution graph CLI library.
//!
//! This crate provides the CLI interface for contribution graphs.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{Config, RangeOverrides};
