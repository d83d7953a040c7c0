//! Day-by-day series for a graph range.
//!
//! The aggregator only emits days that have activity. This module fills a
//! whole range, giving quiet days a zero value, and pairs each day with its
//! style rule.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::classify::classify;
use crate::types::{CellStyleRule, Contribution, ValidationError};

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl GraphRange {
    /// The `days` days ending on `end`, inclusive.
    pub fn last_days(days: u32, end: NaiveDate) -> Result<Self, ValidationError> {
        if days == 0 {
            return Err(ValidationError::Empty { field: "days" });
        }
        let from = end
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or(ValidationError::RangeOutOfBounds { days, end })?;
        Ok(Self { from, to: end })
    }

    /// Every day from `from` through `to`.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.from..=self.to).contains(&date)
    }

    /// Days in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let to = self.to;
        self.from.iter_days().take_while(move |d| *d <= to)
    }
}

/// One day of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionCell {
    pub date: NaiveDate,
    /// 0 = Sunday through 6 = Saturday.
    pub week_day: u32,
    /// 0 = January through 11 = December.
    pub month: u32,
    /// Day of the month, 1-31.
    pub month_date: u32,
    pub year: i32,
    pub value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ContributionCell {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            week_day: date.weekday().num_days_from_sunday(),
            month: date.month0(),
            month_date: date.day(),
            year: date.year(),
            value: 0,
            summary: None,
        }
    }
}

/// A cell with the style rule its value falls into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledCell<'a> {
    #[serde(flatten)]
    pub cell: &'a ContributionCell,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<&'a CellStyleRule>,
}

/// Builds one cell per day of `range`.
///
/// Days without a contribution get a zero value. Contributions outside the
/// range are ignored; repeated dates are summed.
pub fn build_cells(contributions: &[Contribution], range: &GraphRange) -> Vec<ContributionCell> {
    let mut by_day: HashMap<NaiveDate, (u32, Option<&str>)> = HashMap::new();
    for contribution in contributions.iter().filter(|c| range.contains(c.date)) {
        let entry = by_day.entry(contribution.date).or_insert((0, None));
        entry.0 = entry.0.saturating_add(contribution.value);
        if entry.1.is_none() {
            entry.1 = contribution.summary.as_deref();
        }
    }

    range
        .days()
        .map(|date| {
            let mut cell = ContributionCell::empty(date);
            if let Some((value, summary)) = by_day.get(&date) {
                cell.value = *value;
                cell.summary = summary.map(String::from);
            }
            cell
        })
        .collect()
}

/// Classifies every cell against `rules`.
pub fn style_cells<'a>(
    cells: &'a [ContributionCell],
    rules: &'a [CellStyleRule],
) -> Vec<StyledCell<'a>> {
    cells
        .iter()
        .map(|cell| StyledCell {
            cell,
            style: classify(i64::from(cell.value), rules),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn last_days_is_inclusive_of_end() {
        let range = GraphRange::last_days(7, day("2024-01-07")).unwrap();
        assert_eq!(range.from(), day("2024-01-01"));
        assert_eq!(range.days().count(), 7);

        let single = GraphRange::last_days(1, day("2024-01-07")).unwrap();
        assert_eq!(single.from(), single.to());
    }

    #[test]
    fn invalid_ranges() {
        assert_eq!(
            GraphRange::last_days(0, day("2024-01-07")),
            Err(ValidationError::Empty { field: "days" })
        );
        assert_eq!(
            GraphRange::between(day("2024-02-01"), day("2024-01-01")),
            Err(ValidationError::InvalidRange {
                from: day("2024-02-01"),
                to: day("2024-01-01"),
            })
        );
        assert!(matches!(
            GraphRange::last_days(u32::MAX, NaiveDate::MIN),
            Err(ValidationError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn cells_fill_gaps_with_zero() {
        let range = GraphRange::between(day("2024-01-01"), day("2024-01-04")).unwrap();
        let contributions = vec![
            Contribution::new(day("2024-01-02"), 3),
            Contribution::new(day("2023-12-31"), 9),
            Contribution::new(day("2024-01-05"), 9),
        ];
        let values: Vec<_> = build_cells(&contributions, &range)
            .iter()
            .map(|c| (c.date, c.value))
            .collect();
        assert_eq!(
            values,
            vec![
                (day("2024-01-01"), 0),
                (day("2024-01-02"), 3),
                (day("2024-01-03"), 0),
                (day("2024-01-04"), 0),
            ]
        );
    }

    #[test]
    fn cell_calendar_fields() {
        let range = GraphRange::between(day("2024-03-10"), day("2024-03-10")).unwrap();
        let cells = build_cells(&[], &range);
        let cell = &cells[0];
        // 2024-03-10 was a Sunday.
        assert_eq!(cell.week_day, 0);
        assert_eq!(cell.month, 2);
        assert_eq!(cell.month_date, 10);
        assert_eq!(cell.year, 2024);
    }

    #[test]
    fn repeated_days_are_summed_and_keep_summary() {
        let range = GraphRange::between(day("2024-01-01"), day("2024-01-01")).unwrap();
        let mut first = Contribution::new(day("2024-01-01"), 2);
        first.summary = Some("standup".to_string());
        let contributions = vec![first, Contribution::new(day("2024-01-01"), 1)];
        let cells = build_cells(&contributions, &range);
        assert_eq!(cells[0].value, 3);
        assert_eq!(cells[0].summary.as_deref(), Some("standup"));
    }

    #[test]
    fn styled_cells_serialize_flat() {
        let range = GraphRange::between(day("2024-01-01"), day("2024-01-02")).unwrap();
        let cells = build_cells(&[Contribution::new(day("2024-01-02"), 1)], &range);
        let rules = vec![CellStyleRule::new("#9be9a8", 1, 2).with_text("one")];
        let styled = style_cells(&cells, &rules);

        assert_eq!(styled[0].style, None);
        let json = serde_json::to_value(&styled[1]).unwrap();
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["value"], 1);
        assert_eq!(json["style"]["color"], "#9be9a8");
        assert_eq!(json["style"]["text"], "one");
    }
}
