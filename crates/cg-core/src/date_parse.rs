//! Layered date parsing.
//!
//! Text values are tried against an ordered list of parsers and the first
//! success wins:
//!
//! 1. the caller's custom pattern, when one is configured
//! 2. ISO 8601
//! 3. RFC 2822
//! 4. HTTP-date (RFC 1123, RFC 850, asctime)
//! 5. SQL datetime
//! 6. `yyyy-MM-dd HH:mm`
//! 7. `yyyy-MM-ddTHH:mm`
//!
//! Every attempt returns a `Result`; nothing here logs.

use std::fmt;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};
use thiserror::Error;

use crate::record::Timestamp;
use crate::types::ValidationError;

/// Date parsing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateParseError {
    /// A single parser rejected the input.
    #[error("input does not match {parser}")]
    Mismatch { parser: ParserKind },

    /// Every parser in the chain rejected the input.
    #[error("no known date format matches {input:?}")]
    Exhausted { input: String },
}

/// Identifies which parser in the chain produced a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Custom,
    Iso8601,
    Rfc2822,
    HttpDate,
    Sql,
    DateSpaceTime,
    DateTTime,
}

impl ParserKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Custom => "custom format",
            Self::Iso8601 => "ISO 8601",
            Self::Rfc2822 => "RFC 2822",
            Self::HttpDate => "HTTP-date",
            Self::Sql => "SQL datetime",
            Self::DateSpaceTime => "yyyy-MM-dd HH:mm",
            Self::DateTTime => "yyyy-MM-ddTHH:mm",
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully parsed date and the parser that accepted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub timestamp: Timestamp,
    pub parser: ParserKind,
}

type ParseFn = fn(&str) -> Result<Timestamp, DateParseError>;

/// Generic parsers, in the order they are attempted after the custom pattern.
const BUILTIN_PARSERS: [(ParserKind, ParseFn); 6] = [
    (ParserKind::Iso8601, parse_iso8601),
    (ParserKind::Rfc2822, parse_rfc2822),
    (ParserKind::HttpDate, parse_http_date),
    (ParserKind::Sql, parse_sql),
    (ParserKind::DateSpaceTime, parse_date_space_time),
    (ParserKind::DateTTime, parse_date_t_time),
];

/// Ordered fallback chain for textual dates.
#[derive(Debug, Clone, Default)]
pub struct DateParser {
    custom: Option<DatePattern>,
}

impl DateParser {
    /// Builds a chain, placing `custom` first when it is non-blank.
    pub fn new(custom: Option<&str>) -> Self {
        Self {
            custom: custom.and_then(|p| DatePattern::new(p).ok()),
        }
    }

    /// The custom pattern in use, if any.
    pub const fn custom(&self) -> Option<&DatePattern> {
        self.custom.as_ref()
    }

    /// Parses `input`, stopping at the first parser that accepts it.
    pub fn parse(&self, input: &str) -> Result<ParsedDate, DateParseError> {
        let input = input.trim();

        if let Some(timestamp) = self.custom.as_ref().and_then(|p| p.parse(input).ok()) {
            return Ok(ParsedDate {
                timestamp,
                parser: ParserKind::Custom,
            });
        }

        BUILTIN_PARSERS
            .iter()
            .find_map(|(kind, parse)| {
                parse(input).ok().map(|timestamp| ParsedDate {
                    timestamp,
                    parser: *kind,
                })
            })
            .ok_or_else(|| DateParseError::Exhausted {
                input: input.to_string(),
            })
    }
}

/// A user-supplied date pattern.
///
/// Accepts the token syntax used in graph configuration (`yyyy-MM-dd`,
/// `dd/MM/yyyy HH:mm`, `'T'` quoted literals) or, when the pattern contains
/// `%`, a chrono strftime string taken verbatim. Patterns chrono cannot use
/// are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    strftime: String,
}

impl DatePattern {
    pub fn new(pattern: &str) -> Result<Self, ValidationError> {
        if pattern.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "date format",
            });
        }
        let strftime = if pattern.contains('%') {
            pattern.to_string()
        } else {
            translate_tokens(pattern)
        };
        if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
            return Err(ValidationError::InvalidFormat {
                value: pattern.to_string(),
            });
        }
        Ok(Self {
            source: pattern.to_string(),
            strftime,
        })
    }

    /// The pattern as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The equivalent chrono format string.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Parses `input` with this pattern. Date-only patterns yield midnight.
    pub fn parse(&self, input: &str) -> Result<Timestamp, DateParseError> {
        try_formats(
            input,
            ParserKind::Custom,
            &[&self.strftime],
            &[&self.strftime],
            &[&self.strftime],
        )
    }
}

/// Translates pattern tokens into chrono specifiers.
///
/// Letters that are not tokens are kept as literals, so `yyyy-MM-ddTHH:mm`
/// works without quoting the `T`.
fn translate_tokens(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' is an escaped quote; otherwise copy until the closing quote.
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        match token_specifier(c, run) {
            Some(spec) => out.push_str(spec),
            None => (0..run).for_each(|_| push_literal(&mut out, c)),
        }
        i += run;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

const fn token_specifier(token: char, len: usize) -> Option<&'static str> {
    let spec = match (token, len) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M' | 'L', 1 | 2) => "%m",
        ('M' | 'L', 3) => "%b",
        ('M' | 'L', 4) => "%B",
        ('d', 1 | 2) => "%d",
        ('H', 1 | 2) => "%H",
        ('h', 1 | 2) => "%I",
        ('m', 1 | 2) => "%M",
        ('s', 1 | 2) => "%S",
        ('S', 3) => "%3f",
        ('S', _) => "%f",
        ('a', 1) => "%p",
        ('E' | 'c', 3) => "%a",
        ('E' | 'c', 4) => "%A",
        ('Z', 1 | 2) => "%:z",
        ('Z', 3) => "%z",
        ('o', 3) => "%j",
        _ => return None,
    };
    Some(spec)
}

/// Tries zoned, then naive datetime, then date-only formats in turn.
fn try_formats(
    input: &str,
    parser: ParserKind,
    zoned: &[&str],
    naive: &[&str],
    dates: &[&str],
) -> Result<Timestamp, DateParseError> {
    zoned
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(input, fmt).ok().map(Timestamp::from))
        .or_else(|| {
            naive
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok().map(Timestamp::from))
        })
        .or_else(|| {
            dates
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok().map(Timestamp::from))
        })
        .ok_or(DateParseError::Mismatch { parser })
}

fn parse_iso8601(input: &str) -> Result<Timestamp, DateParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.into());
    }
    if let Some(date) = parse_reduced_date(input) {
        return Ok(date.into());
    }

    try_formats(
        &normalize_iso_time(input),
        ParserKind::Iso8601,
        &[
            "%Y-%m-%dT%H:%M:%S%.f%:z",
            "%Y-%m-%dT%H:%M%:z",
            "%Y-%m-%dT%H:%M:%S%.f%z",
            "%Y%m%dT%H%M%S%.f%z",
        ],
        &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y%m%dT%H%M%S%.f",
            "%Y%m%dT%H%M",
        ],
        &["%Y-%m-%d", "%Y%m%d", "%G-W%V-%u"],
    )
}

/// Reduced calendar forms: `YYYY`, `YYYY-MM`, `YYYY-Www` and `YYYY-DDD`.
///
/// Each resolves to the first day it covers.
fn parse_reduced_date(input: &str) -> Option<NaiveDate> {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let year = input.get(..4).filter(|y| digits(y))?;
    let year: i32 = year.parse().ok()?;
    let rest = input.get(4..)?;

    match rest.len() {
        0 => NaiveDate::from_ymd_opt(year, 1, 1),
        3 if rest.starts_with('-') && digits(&rest[1..]) => {
            NaiveDate::from_ymd_opt(year, rest[1..].parse().ok()?, 1)
        }
        4 if rest.starts_with("-W") && digits(&rest[2..]) => {
            NaiveDate::from_isoywd_opt(year, rest[2..].parse().ok()?, Weekday::Mon)
        }
        4 if rest.starts_with('-') && digits(&rest[1..]) => {
            NaiveDate::from_yo_opt(year, rest[1..].parse().ok()?)
        }
        _ => None,
    }
}

/// Expands the shorthands chrono's specifiers reject: a bare `Z`, an
/// hour-only time (`T10`) and an hour-only offset (`+02`).
fn normalize_iso_time(input: &str) -> String {
    let mut out = input
        .strip_suffix(['Z', 'z'])
        .map_or_else(|| input.to_string(), |base| format!("{base}+00:00"));

    let Some(t) = out.find('T') else {
        return out;
    };

    let time = &out.as_bytes()[t + 1..];
    let hour_only = time.len() >= 2
        && time[..2].iter().all(u8::is_ascii_digit)
        && matches!(time.get(2), None | Some(b'+' | b'-'));
    if hour_only {
        out.insert_str(t + 3, ":00");
    }

    let bytes = out.as_bytes();
    let n = bytes.len();
    let short_offset = n > t + 3
        && matches!(bytes[n - 3], b'+' | b'-')
        && bytes[n - 2..].iter().all(u8::is_ascii_digit);
    if short_offset {
        out.push_str(":00");
    }
    out
}

fn parse_rfc2822(input: &str) -> Result<Timestamp, DateParseError> {
    DateTime::parse_from_rfc2822(input)
        .map(Timestamp::from)
        .map_err(|_| DateParseError::Mismatch {
            parser: ParserKind::Rfc2822,
        })
}

/// HTTP-dates are always GMT.
fn parse_http_date(input: &str) -> Result<Timestamp, DateParseError> {
    const FORMATS: [&str; 3] = [
        "%a, %d %b %Y %H:%M:%S GMT",
        "%A, %d-%b-%y %H:%M:%S GMT",
        "%a %b %e %H:%M:%S %Y",
    ];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| Timestamp::from(dt.and_utc()))
        .ok_or(DateParseError::Mismatch {
            parser: ParserKind::HttpDate,
        })
}

fn parse_sql(input: &str) -> Result<Timestamp, DateParseError> {
    try_formats(
        input,
        ParserKind::Sql,
        &[
            "%Y-%m-%d %H:%M:%S%.f %:z",
            "%Y-%m-%d %H:%M:%S%.f%:z",
            "%Y-%m-%d %H:%M:%S%.f %z",
        ],
        &["%Y-%m-%d %H:%M:%S%.f"],
        &["%Y-%m-%d"],
    )
}

fn parse_date_space_time(input: &str) -> Result<Timestamp, DateParseError> {
    try_formats(input, ParserKind::DateSpaceTime, &[], &["%Y-%m-%d %H:%M"], &[])
}

fn parse_date_t_time(input: &str) -> Result<Timestamp, DateParseError> {
    try_formats(input, ParserKind::DateTTime, &[], &["%Y-%m-%dT%H:%M"], &[])
}
