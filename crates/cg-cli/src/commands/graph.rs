//! Graph command: one styled cell per day of a range.

use std::io::Write;

use anyhow::Result;
use cg_core::{build_cells, style_cells};
use chrono::NaiveDate;
use clap::Args;

use crate::commands::aggregate::{collect, write_failures};
use crate::{Config, RangeOverrides};

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Notes to include: `/` for all, a folder, or `#tag`.
    #[arg(default_value = "/")]
    pub selector: String,

    /// Number of days ending today.
    #[arg(long, conflicts_with = "from")]
    pub days: Option<u32>,

    /// First day of the graph (yyyy-MM-dd).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of the graph (yyyy-MM-dd).
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Field holding each note's date.
    #[arg(long)]
    pub field: Option<String>,

    /// Custom date pattern tried before the built-in formats.
    #[arg(long)]
    pub format: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &GraphArgs, config: &Config) -> Result<()> {
    render(writer, args, config, config.today()?)
}

/// Renders the graph with `today` as the default range end.
pub fn render<W: Write>(
    writer: &mut W,
    args: &GraphArgs,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    let range = config.range(
        RangeOverrides {
            days: args.days,
            from: args.from,
            to: args.to,
        },
        today,
    )?;
    let aggregation = collect(
        config,
        &args.selector,
        args.field.as_deref(),
        args.format.as_deref(),
    )?;

    let cells = build_cells(&aggregation.contributions, &range);
    let styled = style_cells(&cells, &config.cell_style_rules);
    tracing::debug!(from = %range.from(), to = %range.to(), cells = cells.len(), "built graph");

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &styled)?;
        writeln!(writer)?;
        return Ok(());
    }

    for entry in &styled {
        let cell = entry.cell;
        write!(writer, "{}  {}", cell.date, cell.value)?;
        match entry.style {
            Some(style) => {
                write!(writer, "  {}", style.color)?;
                if let Some(text) = &style.text {
                    write!(writer, "  {text}")?;
                }
            }
            None => write!(writer, "  -")?,
        }
        writeln!(writer)?;
    }

    write_failures(writer, &aggregation.failures)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::path::Path;

    use cg_core::CellStyleRule;
    use insta::assert_snapshot;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn write_note(root: &Path, name: &str, frontmatter: &str) {
        fs::write(root.join(name), format!("---\n{frontmatter}\n---\n")).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        write_note(temp.path(), "a.md", "date: 2024-01-01\ntags: [work]");
        write_note(temp.path(), "b.md", "date: 2024-01-01 21:00\ntags: [work]");
        write_note(temp.path(), "c.md", "date: 2024-01-03T10:00:00Z");
        write_note(temp.path(), "d.md", "date: someday\ntags: [work]");
        temp
    }

    fn config(root: &Path) -> Config {
        Config {
            vault_path: root.to_path_buf(),
            field_name: Some("date".to_string()),
            cell_style_rules: vec![
                CellStyleRule::new("#eee", 0, 1),
                CellStyleRule::new("#9be9a8", 1, 2).with_text("one"),
                CellStyleRule::new("#40c463", 2, 5),
            ],
            ..Config::default()
        }
    }

    fn args() -> GraphArgs {
        GraphArgs {
            selector: "/".to_string(),
            days: None,
            from: Some(day("2023-12-31")),
            to: Some(day("2024-01-03")),
            field: None,
            format: None,
            json: false,
        }
    }

    #[test]
    fn graph_styles_every_day_in_range() {
        let temp = fixture();
        let mut output = Vec::new();
        render(&mut output, &args(), &config(temp.path()), day("2024-06-01")).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r#"
        2023-12-31  0  #eee
        2024-01-01  2  #40c463
        2024-01-02  0  #eee
        2024-01-03  1  #9be9a8  one
        Skipped 1 record:
        - d: can't parse "someday" in field date as a date
        "#);
    }

    #[test]
    fn graph_tag_selector_and_days() {
        let temp = fixture();
        let mut output = Vec::new();
        let args = GraphArgs {
            selector: "#work".to_string(),
            days: Some(2),
            from: None,
            to: None,
            ..args()
        };
        render(&mut output, &args, &config(temp.path()), day("2024-01-02")).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r#"
        2024-01-01  2  #40c463
        2024-01-02  0  #eee
        Skipped 1 record:
        - d: can't parse "someday" in field date as a date
        "#);
    }

    #[test]
    fn graph_unmatched_values_render_dash() {
        let temp = fixture();
        let mut config = config(temp.path());
        config.cell_style_rules.clear();
        let mut output = Vec::new();
        let args = GraphArgs {
            from: Some(day("2024-01-01")),
            to: Some(day("2024-01-01")),
            ..args()
        };
        render(&mut output, &args, &config, day("2024-06-01")).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.lines().next(), Some("2024-01-01  2  -"));
    }

    #[test]
    fn graph_json_output() {
        let temp = fixture();
        let mut output = Vec::new();
        let args = GraphArgs {
            json: true,
            ..args()
        };
        render(&mut output, &args, &config(temp.path()), day("2024-06-01")).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let cells = json.as_array().unwrap();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[1]["date"], "2024-01-01");
        assert_eq!(cells[1]["week_day"], 1);
        assert_eq!(cells[1]["month"], 0);
        assert_eq!(cells[1]["style"]["color"], "#40c463");
        assert_eq!(cells[3]["style"]["text"], "one");
    }

    #[test]
    fn graph_rejects_inverted_range() {
        let temp = fixture();
        let args = GraphArgs {
            from: Some(day("2024-02-01")),
            to: Some(day("2024-01-01")),
            ..args()
        };
        let err = render(&mut Vec::<u8>::new(), &args, &config(temp.path()), day("2024-06-01"))
            .unwrap_err();
        assert!(err.to_string().contains("invalid date range"));
    }
}
