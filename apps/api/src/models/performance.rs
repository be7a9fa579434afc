use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(Rating {
    Excellent => "excellent",
    Good => "good",
    Satisfactory => "satisfactory",
    NeedsImprovement => "needs_improvement",
    Poor => "poor",
});

impl Rating {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Rating::Excellent
        } else if score >= 80.0 {
            Rating::Good
        } else if score >= 70.0 {
            Rating::Satisfactory
        } else if score >= 60.0 {
            Rating::NeedsImprovement
        } else {
            Rating::Poor
        }
    }
}

text_enum!(Trend {
    Improving => "improving",
    Declining => "declining",
    Stable => "stable",
});

/// Stored monthly performance snapshot for one employee.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PerformanceSnapshot {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_tasks_assigned: i64,
    pub tasks_completed: i64,
    pub tasks_overdue: i64,
    pub avg_task_completion_time: Option<f64>,
    pub total_estimated_hours: f64,
    pub total_actual_hours: f64,
    pub leads_assigned: i64,
    pub leads_contacted: i64,
    pub leads_qualified: i64,
    pub leads_converted: i64,
    pub total_estimated_deal_value: f64,
    pub total_actual_deal_value: f64,
    pub meetings_scheduled: i64,
    pub meetings_completed: i64,
    pub meetings_no_show: i64,
    pub clients_managed: i64,
    pub performance_score: f64,
    pub rating: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_thresholds_are_inclusive() {
        assert_eq!(Rating::from_score(90.0), Rating::Excellent);
        assert_eq!(Rating::from_score(89.99), Rating::Good);
        assert_eq!(Rating::from_score(80.0), Rating::Good);
        assert_eq!(Rating::from_score(70.0), Rating::Satisfactory);
        assert_eq!(Rating::from_score(60.0), Rating::NeedsImprovement);
        assert_eq!(Rating::from_score(59.9), Rating::Poor);
        assert_eq!(Rating::from_score(0.0), Rating::Poor);
    }
}
