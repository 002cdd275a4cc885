use serde::{Deserialize, Serialize};

use crate::kpi::KpiSet;

/// Score floors below which a rule fires. Tunable without touching the
/// rule evaluation itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationThresholds {
    pub communication_score: f64,
    pub delivery_rate: f64,
    pub engagement_rate: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            communication_score: 70.0,
            delivery_rate: 85.0,
            engagement_rate: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// One prioritized action item in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
    pub actions: Vec<String>,
}

/// Evaluate the recommendation rules over a KPI set.
///
/// Externally supplied recommendations (e.g. derived from trend analysis)
/// are appended verbatim. The result is sorted high to low priority; the
/// sort is stable, so order within a priority level is preserved.
pub fn evaluate(
    kpis: &KpiSet,
    extra: &[Recommendation],
    thresholds: &RecommendationThresholds,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if kpis.communication_score < thresholds.communication_score {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "communication".to_string(),
            title: "Improve communication effectiveness".to_string(),
            description: format!(
                "The overall communication score is {:.1}, below the {:.0} target.",
                kpis.communication_score, thresholds.communication_score
            ),
            actions: vec![
                "Review message timing against employee working hours".to_string(),
                "Shorten announcements and lead with the action required".to_string(),
                "Consolidate overlapping channels to reduce noise".to_string(),
            ],
        });
    }

    if kpis.delivery_excellence < thresholds.delivery_rate {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            category: "delivery".to_string(),
            title: "Optimize message delivery".to_string(),
            description: format!(
                "Delivery rate is {:.1}%, below the {:.0}% target.",
                kpis.delivery_excellence, thresholds.delivery_rate
            ),
            actions: vec![
                "Audit failed deliveries for stale or unreachable recipients".to_string(),
                "Verify channel credentials and webhook health".to_string(),
            ],
        });
    }

    if kpis.engagement_quality < thresholds.engagement_rate {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "engagement".to_string(),
            title: "Increase employee engagement".to_string(),
            description: format!(
                "Overall engagement is {:.1}%, below the {:.0}% target.",
                kpis.engagement_quality, thresholds.engagement_rate
            ),
            actions: vec![
                "Target content by department instead of broadcasting".to_string(),
                "Add clear calls to action to high-priority messages".to_string(),
            ],
        });
    }

    recommendations.extend(extra.iter().cloned());
    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
    recommendations
}
