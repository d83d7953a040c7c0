//! Core type definitions with validation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A date range whose start is after its end.
    #[error("invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    /// A range that would leave the supported calendar.
    #[error("date range of {days} days ending {end} is out of bounds")]
    RangeOutOfBounds { days: u32, end: NaiveDate },

    /// A date pattern with a specifier chrono doesn't support.
    #[error("invalid date format: {value}")]
    InvalidFormat { value: String },

    /// A UTC offset that could not be understood.
    #[error("invalid UTC offset: {value}")]
    InvalidOffset { value: String },
}

/// One aggregated day: the number of records dated on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contribution {
    /// Calendar-day key, serialized as `yyyy-MM-dd`.
    pub date: NaiveDate,
    /// Number of records bucketed on this day.
    pub value: u32,
    /// Optional free text shown alongside the day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Contribution {
    /// Creates a contribution without a summary.
    pub const fn new(date: NaiveDate, value: u32) -> Self {
        Self {
            date,
            value,
            summary: None,
        }
    }
}

/// Why a record was left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The date field is absent, null, or blank on the record.
    FieldNotFound { field: String },
    /// The field is present but no known date format matches it.
    UnparseableDate { field: String, value: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound { field } => write!(f, "can't find field {field}"),
            Self::UnparseableDate { field, value } => {
                write!(f, "can't parse {value} in field {field} as a date")
            }
        }
    }
}

/// A record whose date could not be resolved.
///
/// Collected during aggregation rather than raised; the record is excluded
/// from the contribution series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailure {
    /// Identifier of the offending record.
    pub record: String,
    /// What went wrong.
    pub reason: FailureReason,
}

impl ConversionFailure {
    pub fn new(record: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            record: record.into(),
            reason,
        }
    }
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.record, self.reason)
    }
}

/// A threshold rule mapping a value range to a cell color and label.
///
/// The range is half-open: `min` is inclusive, `max` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyleRule {
    /// Background color passed through to the renderer untouched.
    pub color: String,
    /// Text shown inside the cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inclusive lower bound.
    pub min: i64,
    /// Exclusive upper bound.
    pub max: i64,
}

impl CellStyleRule {
    pub fn new(color: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            color: color.into(),
            text: None,
            min,
            max,
        }
    }

    /// Attaches a text label to the rule.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Returns true when `min <= value < max`.
    ///
    /// A rule with `min >= max` never matches.
    pub const fn matches(&self, value: i64) -> bool {
        self.min <= value && value < self.max
    }
}
