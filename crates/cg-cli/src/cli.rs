//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::aggregate::AggregateArgs;
use crate::commands::classify::ClassifyArgs;
use crate::commands::graph::GraphArgs;

/// Contribution graphs for Markdown note vaults.
///
/// Counts notes per day by a date field or file timestamp and maps each
/// day's count to a cell color.
#[derive(Debug, Parser)]
#[command(name = "cg", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count notes per day.
    Aggregate(AggregateArgs),

    /// Show the style rule a value falls into.
    Classify(ClassifyArgs),

    /// Print one styled cell per day of a date range.
    Graph(GraphArgs),
}
