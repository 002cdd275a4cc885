use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap() - Duration::days(1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap() - Duration::days(1)
    }
}

/// Step a (year, month) pair back by `months_back` calendar months.
pub fn months_back(year: i32, month: u32, months_back: u32) -> (i32, u32) {
    let total = year as i64 * 12 + (month as i64 - 1) - months_back as i64;
    let y = total.div_euclid(12) as i32;
    let m = total.rem_euclid(12) as u32 + 1;
    (y, m)
}

/// Midnight UTC at the start of the given date.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

/// The last instant (second resolution) of the given date.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(23, 59, 59).unwrap())
}

/// Canonical monthly period key, e.g. `2025-07`.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{year}-{month:02}")
}

/// Canonical ISO-week period key, e.g. `2025-W31`.
pub fn week_key(date: NaiveDate) -> String {
    let iw = date.iso_week();
    format!("{}-W{:02}", iw.year(), iw.week())
}
