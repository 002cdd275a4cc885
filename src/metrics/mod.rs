pub mod types;

pub use types::*;

/// Percentage of `part` in `whole`, 0.0 when `whole` is zero.
///
/// Every rate in a snapshot is recomputed from its source counts through
/// this helper; rates are never carried independently of the counts they
/// came from.
pub fn rate_pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

impl EmployeeMetric {
    /// Build an employee's metric record from raw activity counts,
    /// recomputing every rate.
    #[allow(clippy::too_many_arguments)]
    pub fn from_counts(
        id: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
        total_messages: u64,
        delivered_count: u64,
        read_count: u64,
        clicked_count: u64,
        response_time_seconds: f64,
        last_activity: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Self {
        let delivery_rate = rate_pct(delivered_count, total_messages);
        let read_rate = rate_pct(read_count, total_messages);
        let click_rate = rate_pct(clicked_count, total_messages);
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
            total_messages,
            delivered_count,
            read_count,
            clicked_count,
            delivery_rate,
            read_rate,
            click_rate,
            engagement_rate: (read_rate + click_rate) / 2.0,
            response_time_seconds,
            last_activity,
        }
    }

    /// An employee counts as engaged once they have read or clicked
    /// anything in the period.
    pub fn is_engaged(&self) -> bool {
        self.read_count > 0 || self.clicked_count > 0
    }

    /// Active means the employee was sent at least one message.
    pub fn is_active(&self) -> bool {
        self.total_messages > 0
    }
}

impl EmployeeRollup {
    /// Aggregate per-employee records into a company rollup. All counts and
    /// the engagement rate are derived from the records themselves.
    pub fn from_employees(per_employee: Vec<EmployeeMetric>) -> Self {
        let employee_count = per_employee.len() as u64;
        let active_employees = per_employee.iter().filter(|e| e.is_active()).count() as u64;
        let engaged_employees = per_employee.iter().filter(|e| e.is_engaged()).count() as u64;
        Self {
            employee_count,
            active_employees,
            engaged_employees,
            engagement_rate: rate_pct(engaged_employees, employee_count),
            per_employee,
        }
    }
}
