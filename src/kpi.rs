use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::CompanyMetricsSnapshot;
use crate::stats;

/// Normalized KPI scores for one company and period.
///
/// Every field except `overall_score` is copied or scaled straight from the
/// snapshot. `message_volume` is the raw message count — deliberately on a
/// different scale than the 0-100 rates, and deliberately included in
/// `overall_score`; downstream consumers must not assume 0-100 bounds for
/// either field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub communication_score: f64,
    pub delivery_excellence: f64,
    pub engagement_quality: f64,
    pub message_volume: f64,
    pub operational_efficiency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_engagement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_productivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_participation: Option<f64>,
    /// Unweighted arithmetic mean of exactly the fields present above.
    pub overall_score: f64,
}

/// Share of employees active in the period, in percent.
///
/// Fails with `InvalidInput` when `employee_count` is zero; the KPI
/// calculator substitutes 0.0 and keeps the field present.
pub fn participation_rate(active_employees: u64, employee_count: u64) -> Result<f64> {
    if employee_count == 0 {
        return Err(Error::InvalidInput(
            "participation rate requires a non-zero employee count".to_string(),
        ));
    }
    Ok(active_employees as f64 / employee_count as f64 * 100.0)
}

impl KpiSet {
    /// Compute the KPI set for one snapshot. Deterministic and side-effect
    /// free; safe to call concurrently for different companies.
    pub fn from_snapshot(snapshot: &CompanyMetricsSnapshot) -> Self {
        let mut kpis = Self {
            communication_score: snapshot.performance.performance_score,
            delivery_excellence: snapshot.delivery.delivery_rate,
            engagement_quality: snapshot.engagement.overall_engagement,
            message_volume: snapshot.overview.total_messages as f64,
            operational_efficiency: snapshot.performance.efficiency,
            employee_engagement: None,
            team_productivity: None,
            active_participation: None,
            overall_score: 0.0,
        };

        if let Some(employees) = &snapshot.employees {
            kpis.employee_engagement = Some(employees.engagement_rate);
            kpis.team_productivity = Some(if employees.employee_count == 0 {
                0.0
            } else {
                snapshot.overview.total_messages as f64 / employees.employee_count as f64
            });
            kpis.active_participation = Some(
                participation_rate(employees.active_employees, employees.employee_count)
                    .unwrap_or_else(|_| {
                        log::warn!("employee rollup has zero employee_count; participation set to 0");
                        0.0
                    }),
            );
        }

        kpis.overall_score = stats::mean(&kpis.present_fields());
        kpis
    }

    /// The KPI fields populated for this company, in declaration order.
    fn present_fields(&self) -> Vec<f64> {
        let mut fields = vec![
            self.communication_score,
            self.delivery_excellence,
            self.engagement_quality,
            self.message_volume,
            self.operational_efficiency,
        ];
        fields.extend(self.employee_engagement);
        fields.extend(self.team_productivity);
        fields.extend(self.active_participation);
        fields
    }
}
