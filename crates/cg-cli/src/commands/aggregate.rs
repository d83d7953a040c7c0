//! Aggregate command: per-day note counts.

use std::io::Write;

use anyhow::{Context, Result};
use cg_core::{Aggregation, Contribution, ConversionFailure, TracingSink, aggregate_from_source};
use cg_vault::Vault;
use clap::Args;
use serde::Serialize;

use crate::Config;

#[derive(Debug, Args)]
pub struct AggregateArgs {
    /// Notes to include: `/` for all, a folder, or `#tag`.
    #[arg(default_value = "/")]
    pub selector: String,

    /// Field holding each note's date (`file.ctime`, `file.mtime`, or a frontmatter key).
    #[arg(long)]
    pub field: Option<String>,

    /// Custom date pattern tried before the built-in formats.
    #[arg(long)]
    pub format: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct AggregateOutput<'a> {
    contributions: &'a [Contribution],
    failures: &'a [ConversionFailure],
}

/// Opens the configured vault and aggregates the selected notes.
pub(crate) fn collect(
    config: &Config,
    selector: &str,
    field: Option<&str>,
    format: Option<&str>,
) -> Result<Aggregation> {
    let vault = Vault::open(&config.vault_path)
        .with_context(|| format!("failed to open vault {}", config.vault_path.display()))?;
    let policy = config.policy(field, format)?;
    tracing::debug!(?policy, selector, "aggregating notes");
    let aggregation = aggregate_from_source(&vault, selector, &policy, &TracingSink)?;
    Ok(aggregation)
}

pub fn run<W: Write>(writer: &mut W, args: &AggregateArgs, config: &Config) -> Result<()> {
    let aggregation = collect(
        config,
        &args.selector,
        args.field.as_deref(),
        args.format.as_deref(),
    )?;

    if args.json {
        let output = AggregateOutput {
            contributions: &aggregation.contributions,
            failures: &aggregation.failures,
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        return Ok(());
    }

    if aggregation.contributions.is_empty() {
        writeln!(writer, "No contributions.")?;
    } else {
        for contribution in &aggregation.contributions {
            writeln!(writer, "{}  {}", contribution.date, contribution.value)?;
        }
        let total = aggregation.total();
        let days = aggregation.contributions.len();
        writeln!(
            writer,
            "{total} record{} across {days} day{}",
            plural(total),
            plural(days as u64)
        )?;
    }

    write_failures(writer, &aggregation.failures)?;
    Ok(())
}

pub(crate) fn write_failures<W: Write>(writer: &mut W, failures: &[ConversionFailure]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    writeln!(
        writer,
        "Skipped {} record{}:",
        failures.len(),
        plural(failures.len() as u64)
    )?;
    for failure in failures {
        writeln!(writer, "- {failure}")?;
    }
    Ok(())
}

const fn plural(n: u64) -> &'static str {
    if n == 1 { "" } else { "s" }
}
