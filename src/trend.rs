use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::period::DateRange;
use crate::stats;

/// One historical period's communication activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period_label: String,
    pub range: DateRange,
    pub total_messages: u64,
    pub delivery_rate: f64,
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    StrongGrowth,
    ModerateGrowth,
    Stable,
    Declining,
}

/// First-versus-last growth summary over a trend series.
///
/// `volume_growth` is relative growth in percent and is `None` when the
/// first period had no messages. The delivery and engagement figures are
/// percentage-point deltas, not relative growth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthAnalysis {
    pub volume_growth: Option<f64>,
    pub delivery_growth: f64,
    pub engagement_growth: f64,
    pub trend_direction: TrendDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalPattern {
    Increasing,
    Decreasing,
    Variable,
    InsufficientData,
}

/// Volume profile of one calendar month across the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalityBucket {
    pub average_messages: f64,
    pub samples: usize,
    pub pattern: SeasonalPattern,
}

/// Compare the first and last points of a chronological series.
///
/// Requires at least two points. The direction classifies the mean of the
/// deltas that exist: above 5 is strong growth, above 0 moderate, above -5
/// stable, anything lower declining.
pub fn growth_analysis(series: &[TrendPoint]) -> Result<GrowthAnalysis> {
    if series.len() < 2 {
        return Err(Error::InvalidInput(
            "growth analysis requires at least two trend points".to_string(),
        ));
    }

    let first = &series[0];
    let last = &series[series.len() - 1];

    let volume_growth = match stats::growth_rate(
        first.total_messages as f64,
        last.total_messages as f64,
    ) {
        Ok(v) => Some(stats::round1(v)),
        Err(Error::DivisionByZero(_)) => None,
        Err(e) => return Err(e),
    };
    let delivery_growth = stats::round1(last.delivery_rate - first.delivery_rate);
    let engagement_growth = stats::round1(last.engagement_rate - first.engagement_rate);

    let mut deltas = vec![delivery_growth, engagement_growth];
    deltas.extend(volume_growth);
    let avg_delta = stats::mean(&deltas);

    let trend_direction = if avg_delta > 5.0 {
        TrendDirection::StrongGrowth
    } else if avg_delta > 0.0 {
        TrendDirection::ModerateGrowth
    } else if avg_delta > -5.0 {
        TrendDirection::Stable
    } else {
        TrendDirection::Declining
    };

    Ok(GrowthAnalysis {
        volume_growth,
        delivery_growth,
        engagement_growth,
        trend_direction,
    })
}

/// Bucket the series by calendar month of each point's start and profile
/// each bucket's message volume.
///
/// A bucket needs at least three samples before its sequence is labelled;
/// below that it reports `InsufficientData`.
pub fn seasonality(series: &[TrendPoint]) -> BTreeMap<u32, SeasonalityBucket> {
    let mut buckets: BTreeMap<u32, Vec<u64>> = BTreeMap::new();
    for point in series {
        buckets
            .entry(point.range.start.month())
            .or_default()
            .push(point.total_messages);
    }

    buckets
        .into_iter()
        .map(|(month, volumes)| {
            let values: Vec<f64> = volumes.iter().map(|v| *v as f64).collect();
            (
                month,
                SeasonalityBucket {
                    average_messages: stats::mean(&values),
                    samples: volumes.len(),
                    pattern: classify_sequence(&volumes),
                },
            )
        })
        .collect()
}

fn classify_sequence(volumes: &[u64]) -> SeasonalPattern {
    if volumes.len() < 3 {
        return SeasonalPattern::InsufficientData;
    }
    if volumes.windows(2).all(|w| w[1] > w[0]) {
        return SeasonalPattern::Increasing;
    }
    if volumes.windows(2).all(|w| w[1] < w[0]) {
        return SeasonalPattern::Decreasing;
    }
    SeasonalPattern::Variable
}
