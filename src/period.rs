use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::date_util::{end_of_day, last_day_of_month, month_key, months_back, start_of_day, week_key};
use crate::error::{Error, Result};

/// Supported report window labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeLabel {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
}

/// A concrete report window. Immutable once resolved from a label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One named historical sub-period used to build a trend series.
///
/// Keys follow the warehouse period formats: `2025-07` for calendar months,
/// `2025-W31` for ISO weeks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSlice {
    pub key: String,
    pub range: DateRange,
}

impl RangeLabel {
    /// Parse a label string (`1d`, `7d`, `30d`, `90d`).
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "1d" => Ok(RangeLabel::OneDay),
            "7d" => Ok(RangeLabel::SevenDays),
            "30d" => Ok(RangeLabel::ThirtyDays),
            "90d" => Ok(RangeLabel::NinetyDays),
            other => Err(Error::PeriodParse(format!("unrecognized label: {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeLabel::OneDay => "1d",
            RangeLabel::SevenDays => "7d",
            RangeLabel::ThirtyDays => "30d",
            RangeLabel::NinetyDays => "90d",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            RangeLabel::OneDay => 1,
            RangeLabel::SevenDays => 7,
            RangeLabel::ThirtyDays => 30,
            RangeLabel::NinetyDays => 90,
        }
    }

    /// Resolve the label to a concrete window ending at `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateRange {
        DateRange {
            start: now - Duration::days(self.days()),
            end: now,
        }
    }

    /// Split history before `now` into the sub-periods a trend series is
    /// built from: `7d` looks back over 8 weekly slices, `30d` over 6
    /// calendar months, everything else over 4 weekly slices.
    ///
    /// Pure in `now`: the same reference instant always yields the same
    /// slices, oldest first.
    pub fn history_slices(&self, now: DateTime<Utc>) -> Vec<PeriodSlice> {
        match self {
            RangeLabel::SevenDays => weekly_slices(now, 8),
            RangeLabel::ThirtyDays => monthly_slices(now, 6),
            _ => weekly_slices(now, 4),
        }
    }
}

impl std::fmt::Display for RangeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl DateRange {
    /// Inclusive duration of the window in whole days.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

fn weekly_slices(now: DateTime<Utc>, count: usize) -> Vec<PeriodSlice> {
    let mut slices = Vec::with_capacity(count);
    for i in (0..count).rev() {
        let end = now - Duration::days(7 * i as i64);
        let start = end - Duration::days(7);
        slices.push(PeriodSlice {
            key: week_key(start.date_naive()),
            range: DateRange { start, end },
        });
    }
    slices
}

fn monthly_slices(now: DateTime<Utc>, count: usize) -> Vec<PeriodSlice> {
    let today = now.date_naive();
    let mut slices = Vec::with_capacity(count);
    for i in (0..count).rev() {
        let (year, month) = months_back(today.year(), today.month(), i as u32);
        let start = start_of_day(chrono::NaiveDate::from_ymd_opt(year, month, 1).unwrap());
        // The current month is still open; clamp it to now.
        let month_end = end_of_day(last_day_of_month(year, month));
        let end = if month_end > now { now } else { month_end };
        slices.push(PeriodSlice {
            key: month_key(year, month),
            range: DateRange { start, end },
        });
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(RangeLabel::parse("1d").unwrap(), RangeLabel::OneDay);
        assert_eq!(RangeLabel::parse("7d").unwrap(), RangeLabel::SevenDays);
        assert_eq!(RangeLabel::parse("30d").unwrap(), RangeLabel::ThirtyDays);
        assert_eq!(RangeLabel::parse("90d").unwrap(), RangeLabel::NinetyDays);
        assert_eq!(RangeLabel::parse(" 30d ").unwrap(), RangeLabel::ThirtyDays);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            RangeLabel::parse("60d"),
            Err(Error::PeriodParse(_))
        ));
        assert!(RangeLabel::parse("garbage").is_err());
        assert!(RangeLabel::parse("").is_err());
    }

    #[test]
    fn test_resolve() {
        let now = at(2025, 7, 31);
        let range = RangeLabel::ThirtyDays.resolve(now);
        assert_eq!(range.end, now);
        assert_eq!(range.num_days(), 30);
        assert_eq!(range.start, now - Duration::days(30));
    }

    #[test]
    fn test_weekly_slices_chronological() {
        let now = at(2025, 7, 31);
        let slices = RangeLabel::SevenDays.history_slices(now);
        assert_eq!(slices.len(), 8);

        for pair in slices.windows(2) {
            assert!(pair[0].range.start < pair[1].range.start);
            assert_eq!(pair[0].range.end, pair[1].range.start);
        }
        assert_eq!(slices.last().unwrap().range.end, now);
        for slice in &slices {
            assert_eq!(slice.range.num_days(), 7);
        }
    }

    #[test]
    fn test_monthly_slices() {
        let now = at(2025, 7, 15);
        let slices = RangeLabel::ThirtyDays.history_slices(now);
        assert_eq!(slices.len(), 6);

        let keys: Vec<&str> = slices.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["2025-02", "2025-03", "2025-04", "2025-05", "2025-06", "2025-07"]
        );

        // Closed months cover the full month; the current month stops at now.
        assert_eq!(
            slices[0].range.start,
            at(2025, 2, 1) - Duration::hours(12)
        );
        assert_eq!(slices.last().unwrap().range.end, now);
    }

    #[test]
    fn test_monthly_slices_cross_year() {
        let now = at(2025, 2, 10);
        let slices = RangeLabel::ThirtyDays.history_slices(now);
        let keys: Vec<&str> = slices.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["2024-09", "2024-10", "2024-11", "2024-12", "2025-01", "2025-02"]
        );
    }

    #[test]
    fn test_default_slices_for_other_labels() {
        let now = at(2025, 7, 31);
        assert_eq!(RangeLabel::OneDay.history_slices(now).len(), 4);
        assert_eq!(RangeLabel::NinetyDays.history_slices(now).len(), 4);
    }

    #[test]
    fn test_slices_reproducible() {
        let now = at(2025, 7, 31);
        assert_eq!(
            RangeLabel::ThirtyDays.history_slices(now),
            RangeLabel::ThirtyDays.history_slices(now)
        );
    }
}
