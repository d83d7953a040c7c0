//! Day-bucketed aggregation.
//!
//! # Algorithm Summary
//!
//! 1. Pick a strategy from the policy: creation time, modification time, or a
//!    named field
//! 2. Resolve each record to a timestamp; field values that are text go
//!    through the [`DateParser`] fallback chain
//! 3. Truncate each timestamp to a calendar day in the policy's zone and count
//!    records per day
//!
//! Records that cannot be dated become [`ConversionFailure`]s. They are
//! returned to the caller and reported to a [`DiagnosticSink`], never raised.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::date_parse::DateParser;
use crate::policy::{DateExtractionPolicy, DateStrategy};
use crate::record::{FieldValue, Record, Timestamp};
use crate::types::{Contribution, ConversionFailure, FailureReason};

/// Errors that abort a whole aggregation.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The record source could not be used at all.
    #[error("data source unavailable for {selector:?}")]
    DataSourceUnavailable {
        selector: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Supplies records for a selector.
pub trait RecordSource {
    type Record: Record;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every record matching `selector`.
    fn fetch(&self, selector: &str) -> Result<Vec<Self::Record>, Self::Error>;
}

/// Receives non-fatal diagnostics from an aggregation.
pub trait DiagnosticSink {
    /// Called once per aggregation when at least one record could not be dated.
    fn conversion_failures(&self, failures: &[ConversionFailure]);
}

/// Reports conversion failures as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn conversion_failures(&self, failures: &[ConversionFailure]) {
        tracing::warn!(count = failures.len(), "some records can't be processed");
        for failure in failures {
            tracing::warn!(record = %failure.record, reason = %failure.reason, "skipping record");
        }
    }
}

/// Result of an aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// One entry per distinct day, ascending by date.
    pub contributions: Vec<Contribution>,
    /// Records left out because they could not be dated.
    pub failures: Vec<ConversionFailure>,
}

impl Aggregation {
    /// Total number of dated records.
    pub fn total(&self) -> u64 {
        self.contributions.iter().map(|c| u64::from(c.value)).sum()
    }
}

/// Groups `records` into per-day counts.
///
/// Never fails: records whose date can't be resolved are excluded and
/// reported through `sink`. An empty input returns an empty result without
/// touching the sink.
pub fn aggregate<R, S>(records: &[R], policy: &DateExtractionPolicy, sink: &S) -> Aggregation
where
    R: Record,
    S: DiagnosticSink + ?Sized,
{
    if records.is_empty() {
        return Aggregation::default();
    }

    let mut days: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    let mut failures = Vec::new();

    match policy.strategy() {
        DateStrategy::Created => {
            for record in records {
                let day = Timestamp::from(record.created_at()).day_in(policy.zone);
                *days.entry(day).or_insert(0) += 1;
            }
        }
        DateStrategy::Modified => {
            for record in records {
                let day = Timestamp::from(record.modified_at()).day_in(policy.zone);
                *days.entry(day).or_insert(0) += 1;
            }
        }
        DateStrategy::Field(name) => {
            let parser = DateParser::new(policy.field_format.as_deref());
            for record in records {
                match resolve_field(record, name, &parser) {
                    Ok(timestamp) => {
                        *days.entry(timestamp.day_in(policy.zone)).or_insert(0) += 1;
                    }
                    Err(reason) => failures.push(ConversionFailure::new(record.id(), reason)),
                }
            }
        }
    }

    if !failures.is_empty() {
        sink.conversion_failures(&failures);
    }

    Aggregation {
        contributions: days
            .into_iter()
            .map(|(date, value)| Contribution::new(date, value))
            .collect(),
        failures,
    }
}

/// Fetches records from `source` and aggregates them.
///
/// A blank selector yields an empty result without consulting the source.
/// A source failure aborts the call with
/// [`AggregateError::DataSourceUnavailable`].
pub fn aggregate_from_source<Src, S>(
    source: &Src,
    selector: &str,
    policy: &DateExtractionPolicy,
    sink: &S,
) -> Result<Aggregation, AggregateError>
where
    Src: RecordSource + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    if selector.trim().is_empty() {
        return Ok(Aggregation::default());
    }

    let records = source
        .fetch(selector)
        .map_err(|e| AggregateError::DataSourceUnavailable {
            selector: selector.to_string(),
            source: Box::new(e),
        })?;
    tracing::debug!(selector, records = records.len(), "fetched records");

    Ok(aggregate(&records, policy, sink))
}

fn resolve_field<R: Record>(
    record: &R,
    name: &str,
    parser: &DateParser,
) -> Result<Timestamp, FailureReason> {
    let value = record
        .field(name)
        .filter(|v| !v.is_missing())
        .ok_or_else(|| FailureReason::FieldNotFound {
            field: name.to_string(),
        })?;

    let unparseable = || FailureReason::UnparseableDate {
        field: name.to_string(),
        value: value.to_string(),
    };

    match value {
        FieldValue::DateTime(timestamp) => Ok(*timestamp),
        FieldValue::Text(text) => parser
            .parse(text)
            .map(|parsed| parsed.timestamp)
            .map_err(|_| unparseable()),
        _ => Err(unparseable()),
    }
}
