//! Classify command: which style rule a value falls into.

use std::io::Write;

use anyhow::Result;
use cg_core::classify;
use clap::Args;

use crate::Config;

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Value to classify.
    #[arg(allow_negative_numbers = true)]
    pub value: i64,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ClassifyArgs, config: &Config) -> Result<()> {
    let rule = classify(args.value, &config.cell_style_rules);

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &rule)?;
        writeln!(writer)?;
        return Ok(());
    }

    match rule {
        Some(rule) => {
            write!(writer, "{} [{}, {})", rule.color, rule.min, rule.max)?;
            if let Some(text) = &rule.text {
                write!(writer, " {text}")?;
            }
            writeln!(writer)?;
        }
        None => writeln!(writer, "no match")?,
    }
    Ok(())
}
