//! Pure statistical primitives shared by the comparison and trend modules.
//!
//! Empty inputs return 0.0 rather than failing so that aggregate reports
//! can still render when a sub-population is missing.

use std::cmp::Ordering;

use crate::error::{Error, Result};

/// Arithmetic mean. 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; the average of the two middle elements for even-length input.
/// 0.0 for empty input.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    #[allow(clippy::manual_is_multiple_of)]
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation: mean of squared deviations, then the
/// square root. 0.0 for empty input.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Percentage of population values at or below `value`, rounded to one
/// decimal. 0.0 for an empty population.
///
/// Stable under duplicates: every occurrence of `value` in the population
/// counts toward the rank, so the result is non-decreasing in `value`.
pub fn percentile_rank(value: f64, population: &[f64]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }

    let at_or_below = population.iter().filter(|v| **v <= value).count();
    round1(at_or_below as f64 / population.len() as f64 * 100.0)
}

/// Relative growth from `first` to `last`, in percent.
///
/// Fails with `DivisionByZero` when `first` is zero; callers substitute a
/// `None` in their output record rather than propagating an infinity.
pub fn growth_rate(first: f64, last: f64) -> Result<f64> {
    if first == 0.0 {
        return Err(Error::DivisionByZero("growth rate".to_string()));
    }
    Ok((last - first) / first * 100.0)
}

/// Round to one decimal place.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
