use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::kpi::KpiSet;
use crate::metrics::CompanyMetricsSnapshot;
use crate::stats;

/// The closed set of metrics companies can be compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Delivery,
    Engagement,
    Volume,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Delivery, Metric::Engagement, Metric::Volume];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Delivery => "delivery",
            Metric::Engagement => "engagement",
            Metric::Volume => "volume",
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivery" => Ok(Metric::Delivery),
            "engagement" => Ok(Metric::Engagement),
            "volume" => Ok(Metric::Volume),
            other => Err(Error::UnknownMetric(other.to_string())),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One member of a declared peer set.
#[derive(Debug, Clone, PartialEq)]
pub struct Peer {
    pub id: String,
    pub name: String,
    pub snapshot: CompanyMetricsSnapshot,
}

/// Descriptive statistics for one metric across a peer set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparativeMetricStats {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub median: f64,
    pub standard_deviation: f64,
}

/// One row of a ranking, rank 1 = highest value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    pub company_id: String,
    pub name: String,
    pub value: f64,
    pub rank: usize,
    pub percentile: f64,
}

pub type Ranking = Vec<RankEntry>;

/// A leader or laggard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricStanding {
    pub company_id: String,
    pub name: String,
    pub value: f64,
}

/// Segment averages over a peer set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryAverage {
    pub delivery_rate: f64,
    pub engagement_rate: f64,
    pub message_volume: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceLevel {
    Above,
    Below,
}

/// A company's standing against its segment average on one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkEntry {
    pub current: f64,
    pub industry: f64,
    pub performance: PerformanceLevel,
}

/// Read one metric's value out of a snapshot.
pub fn metric_value(snapshot: &CompanyMetricsSnapshot, metric: Metric) -> f64 {
    match metric {
        Metric::Delivery => snapshot.delivery.delivery_rate,
        Metric::Engagement => snapshot.engagement.overall_engagement,
        Metric::Volume => snapshot.overview.total_messages as f64,
    }
}

/// Descriptive statistics for `metric` across the peer set. All zeros for
/// an empty set; comparative reports must still render for isolated
/// companies.
pub fn comparative_stats(peers: &[Peer], metric: Metric) -> ComparativeMetricStats {
    let values: Vec<f64> = peers
        .iter()
        .map(|p| metric_value(&p.snapshot, metric))
        .collect();
    if values.is_empty() {
        return ComparativeMetricStats::default();
    }

    ComparativeMetricStats {
        average: stats::mean(&values),
        max: values.iter().cloned().fold(f64::MIN, f64::max),
        min: values.iter().cloned().fold(f64::MAX, f64::min),
        median: stats::median(&values),
        standard_deviation: stats::std_dev(&values),
    }
}

/// Rank the peer set on `metric`, highest value first.
///
/// The sort is stable, so peers with equal values keep their input order.
/// Percentile is `(N - rank + 1) / N * 100`, rounded to one decimal.
pub fn rank(peers: &[Peer], metric: Metric) -> Ranking {
    let mut scored: Vec<(&Peer, f64)> = peers
        .iter()
        .map(|p| (p, metric_value(&p.snapshot, metric)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let n = scored.len();
    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (peer, value))| {
            let rank = idx + 1;
            RankEntry {
                company_id: peer.id.clone(),
                name: peer.name.clone(),
                value,
                rank,
                percentile: stats::round1((n - rank + 1) as f64 / n as f64 * 100.0),
            }
        })
        .collect()
}

/// Percentile of `value` within a peer population.
pub fn percentile(value: f64, population: &[f64]) -> f64 {
    stats::percentile_rank(value, population)
}

/// Top `top_n` peers on `metric`, zero-valued entries excluded.
pub fn leaders(peers: &[Peer], metric: Metric, top_n: usize) -> Vec<MetricStanding> {
    standings(peers, metric, top_n, true)
}

/// Bottom `top_n` peers on `metric`, zero-valued entries excluded.
pub fn laggards(peers: &[Peer], metric: Metric, top_n: usize) -> Vec<MetricStanding> {
    standings(peers, metric, top_n, false)
}

fn standings(peers: &[Peer], metric: Metric, top_n: usize, descending: bool) -> Vec<MetricStanding> {
    let mut scored: Vec<MetricStanding> = peers
        .iter()
        .map(|p| MetricStanding {
            company_id: p.id.clone(),
            name: p.name.clone(),
            value: metric_value(&p.snapshot, metric),
        })
        .filter(|s| s.value != 0.0)
        .collect();

    scored.sort_by(|a, b| {
        let ord = a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    scored.truncate(top_n);
    scored
}

/// Average delivery/engagement/volume across a segment's peers, or `None`
/// when the segment is empty.
pub fn industry_average(peers: &[Peer]) -> Option<IndustryAverage> {
    if peers.is_empty() {
        return None;
    }

    let collect = |metric: Metric| -> Vec<f64> {
        peers
            .iter()
            .map(|p| metric_value(&p.snapshot, metric))
            .collect()
    };

    Some(IndustryAverage {
        delivery_rate: stats::mean(&collect(Metric::Delivery)),
        engagement_rate: stats::mean(&collect(Metric::Engagement)),
        message_volume: stats::mean(&collect(Metric::Volume)),
        sample_size: peers.len(),
    })
}

/// Compare a company's KPIs to its segment averages.
///
/// Classification is strictly-greater: a tie counts as `Below`.
pub fn benchmark(
    kpis: &KpiSet,
    industry: &IndustryAverage,
) -> BTreeMap<Metric, BenchmarkEntry> {
    let pairs = [
        (Metric::Delivery, kpis.delivery_excellence, industry.delivery_rate),
        (Metric::Engagement, kpis.engagement_quality, industry.engagement_rate),
        (Metric::Volume, kpis.message_volume, industry.message_volume),
    ];

    pairs
        .into_iter()
        .map(|(metric, current, segment)| {
            let performance = if current > segment {
                PerformanceLevel::Above
            } else {
                PerformanceLevel::Below
            };
            (
                metric,
                BenchmarkEntry {
                    current,
                    industry: segment,
                    performance,
                },
            )
        })
        .collect()
}
