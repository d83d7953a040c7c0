//! How a record's date is found.

use chrono::{FixedOffset, Offset, Utc};

use crate::types::ValidationError;

/// Sentinel field name selecting a record's intrinsic creation time.
pub const FILE_CTIME_FIELD: &str = "file.ctime";

/// Sentinel field name selecting a record's intrinsic modification time.
pub const FILE_MTIME_FIELD: &str = "file.mtime";

/// Configuration describing how to date each record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateExtractionPolicy {
    /// Field holding the date. `None` or blank means creation time.
    pub field_name: Option<String>,
    /// Pattern tried before the generic formats.
    pub field_format: Option<String>,
    /// Offset used when truncating zoned instants to a calendar day.
    pub zone: FixedOffset,
}

impl Default for DateExtractionPolicy {
    fn default() -> Self {
        Self {
            field_name: None,
            field_format: None,
            zone: Utc.fix(),
        }
    }
}

/// The resolution strategy selected by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStrategy<'a> {
    Created,
    Modified,
    Field(&'a str),
}

impl DateExtractionPolicy {
    /// Dates records by the named field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            field_name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.field_format = Some(format.into());
        self
    }

    #[must_use]
    pub const fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }

    pub fn strategy(&self) -> DateStrategy<'_> {
        match self.field_name.as_deref().map(str::trim) {
            None | Some("" | FILE_CTIME_FIELD) => DateStrategy::Created,
            Some(FILE_MTIME_FIELD) => DateStrategy::Modified,
            Some(name) => DateStrategy::Field(name),
        }
    }
}

/// Parses a UTC offset such as `utc`, `Z`, `+02:00`, `-0530` or `+2`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, ValidationError> {
    let invalid = || ValidationError::InvalidOffset {
        value: value.to_string(),
    };
    let trimmed = value.trim();

    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 && rest.is_ascii() => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_uses_creation_time() {
        assert_eq!(DateExtractionPolicy::default().strategy(), DateStrategy::Created);
        assert_eq!(DateExtractionPolicy::field("").strategy(), DateStrategy::Created);
    }

    #[test]
    fn sentinels_select_intrinsic_times() {
        assert_eq!(
            DateExtractionPolicy::field(FILE_CTIME_FIELD).strategy(),
            DateStrategy::Created
        );
        assert_eq!(
            DateExtractionPolicy::field(FILE_MTIME_FIELD).strategy(),
            DateStrategy::Modified
        );
    }

    #[test]
    fn other_names_use_field_lookup() {
        assert_eq!(
            DateExtractionPolicy::field("due").strategy(),
            DateStrategy::Field("due")
        );
    }

    #[test]
    fn offsets() {
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_utc_offset("-0530").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_utc_offset("+9").unwrap().local_minus_utc(), 32400);
    }

    #[test]
    fn bad_offsets() {
        for value in ["", "local", "02:00", "+25:00", "+01:75", "+ab", "+1é1", "-é:00"] {
            assert!(parse_utc_offset(value).is_err(), "{value}");
        }
    }
}
