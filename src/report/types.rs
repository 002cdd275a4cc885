use std::collections::BTreeMap;

use serde::Serialize;

use crate::compare::{
    BenchmarkEntry, ComparativeMetricStats, IndustryAverage, Metric, MetricStanding, Ranking,
};
use crate::kpi::KpiSet;
use crate::metrics::{
    ChannelMetrics, CompanyMetricsSnapshot, DeliveryMetrics, EmployeeRollup, EngagementMetrics,
    OverviewMetrics, PerformanceMetrics,
};
use crate::period::{DateRange, RangeLabel};
use crate::provider::CompanyInfo;
use crate::recommend::Recommendation;
use crate::trend::{GrowthAnalysis, SeasonalityBucket, TrendPoint};

/// The resolved window a report covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPeriod {
    pub label: RangeLabel,
    pub range: DateRange,
}

/// The company's communication metrics for the period, as reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunicationSummary {
    pub overview: OverviewMetrics,
    pub delivery: DeliveryMetrics,
    pub engagement: EngagementMetrics,
    pub channels: BTreeMap<String, ChannelMetrics>,
    pub performance: PerformanceMetrics,
}

impl CommunicationSummary {
    pub fn from_snapshot(snapshot: &CompanyMetricsSnapshot) -> Self {
        Self {
            overview: snapshot.overview.clone(),
            delivery: snapshot.delivery.clone(),
            engagement: snapshot.engagement.clone(),
            channels: snapshot.channels.clone(),
            performance: snapshot.performance.clone(),
        }
    }
}

/// How the company stands against its industry segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSection {
    /// `None` when the segment has no other members.
    pub industry: Option<IndustryAverage>,
    pub benchmarks: BTreeMap<Metric, BenchmarkEntry>,
    /// The company's percentile within its segment, per metric.
    pub percentiles: BTreeMap<Metric, f64>,
    pub peer_count: usize,
}

/// Historical activity series with its growth and seasonality readouts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSection {
    pub series: Vec<TrendPoint>,
    pub growth: GrowthAnalysis,
    pub seasonality: BTreeMap<u32, SeasonalityBucket>,
}

/// Single-company report. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyReport {
    pub company: CompanyInfo,
    pub report_period: ReportPeriod,
    pub communication: CommunicationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<EmployeeRollup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonSection>,
    pub insights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<TrendSection>,
    pub kpis: KpiSet,
    pub recommendations: Vec<Recommendation>,
}

/// One company's row in a comparative report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeCompany {
    pub id: String,
    pub name: String,
    /// Raw value per compared metric.
    pub metrics: BTreeMap<Metric, f64>,
    pub kpis: KpiSet,
}

/// Multi-company report. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeReport {
    pub comparison_period: ReportPeriod,
    pub companies: Vec<ComparativeCompany>,
    pub comparisons: BTreeMap<Metric, ComparativeMetricStats>,
    pub rankings: BTreeMap<Metric, Ranking>,
    pub leaders: BTreeMap<Metric, Vec<MetricStanding>>,
    pub laggards: BTreeMap<Metric, Vec<MetricStanding>>,
    pub insights: Vec<String>,
}
