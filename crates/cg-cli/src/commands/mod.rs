//! CLI subcommand implementations.

pub mod aggregate;
pub mod classify;
pub mod graph;
