//! Core domain logic for contribution graphs.
//!
//! This crate contains the fundamental types and logic for:
//! - Aggregation: bucketing dated records into per-day counts
//! - Date parsing: the layered fallback chain for textual dates
//! - Classification: mapping a day's count to a cell style rule
//! - Series: filling a date range with one cell per day

mod aggregate;
mod classify;
pub mod date_parse;
mod policy;
pub mod record;
pub mod series;
pub mod types;

pub use aggregate::{
    AggregateError, Aggregation, DiagnosticSink, RecordSource, TracingSink, aggregate,
    aggregate_from_source,
};
pub use classify::{classify, default_rules};
pub use date_parse::{DateParseError, DateParser, DatePattern, ParsedDate, ParserKind};
pub use policy::{
    DateExtractionPolicy, DateStrategy, FILE_CTIME_FIELD, FILE_MTIME_FIELD, parse_utc_offset,
};
pub use record::{FieldValue, MapRecord, Record, Timestamp};
pub use series::{ContributionCell, GraphRange, StyledCell, build_cells, style_cells};
pub use types::{CellStyleRule, Contribution, ConversionFailure, FailureReason, ValidationError};
