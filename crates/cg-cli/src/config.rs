//! Configuration loading and management.

use std::path::{Path, PathBuf};

use cg_core::{
    CellStyleRule, DateExtractionPolicy, DatePattern, GraphRange, ValidationError, default_rules,
};
use chrono::{FixedOffset, Local, NaiveDate, Utc};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Number of days shown when no range is configured.
pub const DEFAULT_DAYS: u32 = 365;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root folder of the note vault.
    pub vault_path: PathBuf,

    /// Field holding each note's date. Unset means file creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    /// Pattern tried before the generic date formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_format: Option<String>,

    /// Zone for day bucketing: `utc`, `local`, or an offset like `+02:00`.
    pub timezone: String,

    /// Default graph length in days, ending today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,

    /// Default graph start date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,

    /// Default graph end date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,

    /// Ordered cell style rules; the first matching rule wins.
    pub cell_style_rules: Vec<CellStyleRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_path: PathBuf::from("."),
            field_name: None,
            field_format: None,
            timezone: "utc".to_string(),
            days: None,
            from_date: None,
            to_date: None,
            cell_style_rules: default_rules(),
        }
    }
}

/// Range overrides given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeOverrides {
    pub days: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CG_*)
        figment = figment.merge(Env::prefixed("CG_"));

        figment.extract()
    }

    /// Resolves the bucketing zone. `local` is fixed at the current offset.
    pub fn zone(&self) -> Result<FixedOffset, ValidationError> {
        if self.timezone.trim().eq_ignore_ascii_case("local") {
            return Ok(*Local::now().offset());
        }
        cg_core::parse_utc_offset(&self.timezone)
    }

    /// Builds the extraction policy, letting command-line values win.
    pub fn policy(
        &self,
        field: Option<&str>,
        format: Option<&str>,
    ) -> Result<DateExtractionPolicy, ValidationError> {
        let field_format = format.map(String::from).or_else(|| self.field_format.clone());
        if let Some(pattern) = field_format.as_deref().filter(|p| !p.trim().is_empty()) {
            DatePattern::new(pattern)?;
        }
        Ok(DateExtractionPolicy {
            field_name: field.map(String::from).or_else(|| self.field_name.clone()),
            field_format,
            zone: self.zone()?,
        })
    }

    /// Today's date in the bucketing zone.
    pub fn today(&self) -> Result<NaiveDate, ValidationError> {
        Ok(Utc::now().with_timezone(&self.zone()?).date_naive())
    }

    /// Resolves the graph range.
    ///
    /// Explicit dates beat a day count, and command-line values beat config.
    pub fn range(
        &self,
        overrides: RangeOverrides,
        today: NaiveDate,
    ) -> Result<GraphRange, ValidationError> {
        let (from, to, days) = if overrides.from.is_some()
            || overrides.to.is_some()
            || overrides.days.is_some()
        {
            (overrides.from, overrides.to, overrides.days)
        } else {
            (self.from_date, self.to_date, self.days)
        };

        match (from, to) {
            (Some(from), Some(to)) => GraphRange::between(from, to),
            (Some(from), None) => GraphRange::between(from, today),
            (None, end) => {
                GraphRange::last_days(days.unwrap_or(DEFAULT_DAYS), end.unwrap_or(today))
            }
        }
    }
}

/// Returns the platform-specific config directory for cg.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cg"))
}
