use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fixed-period read of one company's communication and employee metrics.
///
/// Produced by a `MetricsProvider`; the engine treats it as read-only input.
/// Rates are percentages in `[0, 100]`, counts are non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetricsSnapshot {
    pub overview: OverviewMetrics,
    pub delivery: DeliveryMetrics,
    pub engagement: EngagementMetrics,
    /// Per-channel breakdown, keyed by channel id.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelMetrics>,
    pub performance: PerformanceMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<EmployeeRollup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub total_messages: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryMetrics {
    pub delivered_count: u64,
    /// Percentage of sent messages that were delivered.
    pub delivery_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub read_count: u64,
    pub read_rate: f64,
    pub click_count: u64,
    /// Composite engagement percentage across read and click activity.
    pub overall_engagement: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetrics {
    pub total: u64,
    pub delivery_rate: f64,
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub efficiency: f64,
    pub reliability: f64,
    pub speed: f64,
    /// Composite 0-100 score computed by the provider.
    pub performance_score: f64,
}

/// Employee activity aggregate for one company and period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRollup {
    pub employee_count: u64,
    pub active_employees: u64,
    pub engaged_employees: u64,
    /// Percentage of employees with any read or click activity.
    pub engagement_rate: f64,
    #[serde(default)]
    pub per_employee: Vec<EmployeeMetric>,
}

/// Per-employee activity, derived deterministically from that employee's
/// message history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeMetric {
    pub id: String,
    pub name: String,
    pub department: String,
    pub total_messages: u64,
    pub delivered_count: u64,
    pub read_count: u64,
    pub clicked_count: u64,
    pub delivery_rate: f64,
    pub read_rate: f64,
    pub click_rate: f64,
    pub engagement_rate: f64,
    pub response_time_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}
