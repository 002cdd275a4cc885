pub mod types;

pub use types::*;

use crate::compare::{Metric, PerformanceLevel};
use crate::period::RangeLabel;
use crate::recommend::{Priority, Recommendation};
use crate::trend::TrendDirection;

/// Parameters for a single-company report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyReportRequest {
    pub company_id: String,
    pub date_range_label: RangeLabel,
    pub include_comparison: bool,
    pub include_employee_details: bool,
    pub include_trends: bool,
}

impl CompanyReportRequest {
    /// A full report request: comparison and trends on, employee detail off.
    pub fn new(company_id: impl Into<String>, label: RangeLabel) -> Self {
        Self {
            company_id: company_id.into(),
            date_range_label: label,
            include_comparison: true,
            include_employee_details: false,
            include_trends: true,
        }
    }

    /// Deterministic cache key covering every input that shapes the output.
    pub fn fingerprint(&self) -> String {
        format!(
            "company:{}:{}:cmp={}:emp={}:trend={}",
            self.company_id,
            self.date_range_label,
            u8::from(self.include_comparison),
            u8::from(self.include_employee_details),
            u8::from(self.include_trends),
        )
    }
}

/// Parameters for a multi-company comparative report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparativeReportRequest {
    pub company_ids: Vec<String>,
    pub date_range_label: RangeLabel,
    /// Metrics to compare on; empty means all.
    pub metrics: Vec<Metric>,
}

impl ComparativeReportRequest {
    pub fn new(company_ids: Vec<String>, label: RangeLabel) -> Self {
        Self {
            company_ids,
            date_range_label: label,
            metrics: Vec::new(),
        }
    }

    /// The metrics to compare on, defaulted and deduplicated.
    pub fn resolved_metrics(&self) -> Vec<Metric> {
        if self.metrics.is_empty() {
            return Metric::ALL.to_vec();
        }
        let mut metrics = self.metrics.clone();
        metrics.sort_unstable();
        metrics.dedup();
        metrics
    }

    /// Deterministic cache key; company order does not matter.
    pub fn fingerprint(&self) -> String {
        let mut ids = self.company_ids.clone();
        ids.sort_unstable();
        let metrics: Vec<&str> = self
            .resolved_metrics()
            .iter()
            .map(|m| m.as_str())
            .collect();
        format!(
            "comparative:{}:{}:metrics={}",
            ids.join(","),
            self.date_range_label,
            metrics.join(","),
        )
    }
}

/// Human-readable findings for a company report, derived from the
/// comparison and trend sections.
pub fn company_insights(
    comparison: Option<&ComparisonSection>,
    trends: Option<&TrendSection>,
) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(comparison) = comparison {
        if let Some(industry) = &comparison.industry {
            for (metric, entry) in &comparison.benchmarks {
                let direction = match entry.performance {
                    PerformanceLevel::Above => "above",
                    PerformanceLevel::Below => "below",
                };
                insights.push(format!(
                    "{} is {} the industry average of {:.1} (sample of {})",
                    metric_label(*metric),
                    direction,
                    entry.industry,
                    industry.sample_size,
                ));
            }
        } else {
            insights.push("No industry peers available for comparison".to_string());
        }
    }

    if let Some(trends) = trends {
        let direction = match trends.growth.trend_direction {
            TrendDirection::StrongGrowth => "growing strongly",
            TrendDirection::ModerateGrowth => "growing",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        };
        insights.push(format!(
            "Communication activity is {direction} across the last {} periods",
            trends.series.len()
        ));
        if let Some(volume_growth) = trends.growth.volume_growth {
            insights.push(format!(
                "Message volume changed {volume_growth:+.1}% from the first to the last period"
            ));
        }
    }

    insights
}

/// Cross-company findings for a comparative report.
pub fn comparative_insights(report_companies: &[ComparativeCompany], metrics: &[Metric]) -> Vec<String> {
    let mut insights = Vec::new();

    for metric in metrics {
        let top = report_companies
            .iter()
            .max_by(|a, b| {
                let av = a.metrics.get(metric).copied().unwrap_or(0.0);
                let bv = b.metrics.get(metric).copied().unwrap_or(0.0);
                av.partial_cmp(&bv).unwrap_or(std::cmp::Ordering::Equal)
            });
        if let Some(top) = top {
            let value = top.metrics.get(metric).copied().unwrap_or(0.0);
            insights.push(format!(
                "{} leads on {} at {:.1}",
                top.name,
                metric_label(*metric),
                value
            ));
        }
    }

    insights
}

/// Extra recommendations driven by the trend readout, appended after the
/// KPI rules.
pub fn trend_recommendations(section: &TrendSection) -> Vec<Recommendation> {
    match section.growth.trend_direction {
        TrendDirection::Declining => vec![Recommendation {
            priority: Priority::High,
            category: "trend".to_string(),
            title: "Reverse the activity decline".to_string(),
            description: "Communication activity has declined across recent periods.".to_string(),
            actions: vec![
                "Compare current send volume and timing with the strongest recent period"
                    .to_string(),
                "Survey channel owners for delivery or content changes".to_string(),
            ],
        }],
        TrendDirection::Stable | TrendDirection::ModerateGrowth | TrendDirection::StrongGrowth => {
            Vec::new()
        }
    }
}

fn metric_label(metric: Metric) -> &'static str {
    match metric {
        Metric::Delivery => "Delivery rate",
        Metric::Engagement => "Engagement",
        Metric::Volume => "Message volume",
    }
}
