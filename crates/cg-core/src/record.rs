//! Read-only views over source records.
//!
//! Aggregation never indexes raw maps. A record exposes one field lookup
//! plus the two intrinsic timestamps, and field values are typed so the
//! date fallback logic can tell structured dates from text.

use std::collections::BTreeMap;
use std::fmt;
use std::num::FpCategory;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// A point in time as found on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// An instant with a known UTC offset.
    Zoned(DateTime<FixedOffset>),
    /// A wall-clock reading with no zone information.
    Naive(NaiveDateTime),
}

impl Timestamp {
    /// Calendar day of this timestamp as seen from `zone`.
    ///
    /// Zoned instants are converted first; naive readings keep their written date.
    pub fn day_in(&self, zone: FixedOffset) -> NaiveDate {
        match self {
            Self::Zoned(dt) => dt.with_timezone(&zone).date_naive(),
            Self::Naive(dt) => dt.date(),
        }
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Zoned(dt)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Zoned(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Naive(dt)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Self::Naive(date.and_time(NaiveTime::default()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// A single field value on a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Already a structured date/time; used without parsing.
    DateTime(Timestamp),
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<FieldValue>),
    Object(BTreeMap<String, FieldValue>),
    Null,
}

impl FieldValue {
    /// Null, `false`, zero, NaN and blank text count as an absent field.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null | Self::Bool(false) => true,
            Self::Number(n) => matches!(n.classify(), FpCategory::Zero | FpCategory::Nan),
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateTime(ts) => write!(f, "{ts}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(_) => f.write_str("{...}"),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(ts: Timestamp) -> Self {
        Self::DateTime(ts)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// A source item that can be dated.
///
/// This trait allows aggregation to work with different record
/// representations (e.g., vault notes, or test fixtures).
pub trait Record {
    /// Identifier used in diagnostics.
    fn id(&self) -> &str;

    /// Looks up a field by exact name.
    fn field(&self, name: &str) -> Option<&FieldValue>;

    /// Intrinsic creation time of the item.
    fn created_at(&self) -> DateTime<Utc>;

    /// Intrinsic last-modification time of the item.
    fn modified_at(&self) -> DateTime<Utc>;
}

/// A record backed by an in-memory field map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl MapRecord {
    /// Creates a record with both intrinsic timestamps set to `timestamp`.
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at: timestamp,
            modified_at: timestamp,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn with_modified(mut self, modified_at: DateTime<Utc>) -> Self {
        self.modified_at = modified_at;
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builds a record from a JSON object, taking every key as a field.
    pub fn from_json(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        object: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let mut record = Self::new(id, timestamp);
        record.fields = object
            .into_iter()
            .map(|(k, v)| (k, FieldValue::from(v)))
            .collect();
        record
    }
}

impl Record for MapRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoned_day_follows_bucket_zone() {
        let ts: Timestamp = DateTime::parse_from_rfc3339("2024-01-01T23:30:00-05:00")
            .unwrap()
            .into();
        let utc = FixedOffset::east_opt(0).unwrap();
        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(ts.day_in(utc), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(
            ts.day_in(new_york),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn naive_day_ignores_bucket_zone() {
        let ts = Timestamp::from(
            NaiveDate::from_ymd_opt(2024, 6, 30)
                .unwrap()
                .and_hms_opt(23, 59, 0)
                .unwrap(),
        );
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(ts.day_in(tokyo), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn missing_values() {
        assert!(FieldValue::Null.is_missing());
        assert!(FieldValue::from("   ").is_missing());
        assert!(!FieldValue::from("2024-01-01").is_missing());
        assert!(FieldValue::Number(0.0).is_missing());
        assert!(FieldValue::Number(f64::NAN).is_missing());
        assert!(FieldValue::Bool(false).is_missing());
        assert!(!FieldValue::Number(1.0).is_missing());
        assert!(!FieldValue::Bool(true).is_missing());
        assert!(!FieldValue::List(vec![]).is_missing());
    }

    #[test]
    fn json_values_convert() {
        let value = serde_json::json!({
            "date": "2024-01-01",
            "count": 3,
            "done": true,
            "tags": ["a", null],
        });
        let serde_json::Value::Object(map) = value else {
            unreachable!()
        };
        let record = MapRecord::from_json("note", Utc::now(), map);
        assert_eq!(record.field("date"), Some(&FieldValue::from("2024-01-01")));
        assert_eq!(record.field("count"), Some(&FieldValue::Number(3.0)));
        assert_eq!(record.field("done"), Some(&FieldValue::Bool(true)));
        assert_eq!(
            record.field("tags"),
            Some(&FieldValue::List(vec![FieldValue::from("a"), FieldValue::Null]))
        );
        assert_eq!(record.field("absent"), None);
    }

    #[test]
    fn display_quotes_text_and_lists() {
        let list = FieldValue::List(vec![FieldValue::from("x"), FieldValue::Number(2.5)]);
        assert_eq!(list.to_string(), r#"["x", 2.5]"#);
        assert_eq!(FieldValue::Bool(false).to_string(), "false");
    }
}
