//! Employee performance scoring.
//!
//! `ActivityCounts` is what the database knows about one employee over a
//! period; `PerformanceMetrics::from_counts` turns it into rates, a 0–100 score
//! and a rating without touching the database, so every rule here is unit
//! tested directly.

pub mod handlers;
pub mod metrics;

use serde::Serialize;
use sqlx::FromRow;

use crate::models::performance::{Rating, Trend};

const TASK_WEIGHT: f64 = 0.30;
const CONVERSION_WEIGHT: f64 = 0.25;
const MEETING_WEIGHT: f64 = 0.20;
const EFFICIENCY_WEIGHT: f64 = 0.15;
const OVERDUE_WEIGHT: f64 = 0.10;

/// Score difference between two periods that counts as a real change.
const TREND_BAND: f64 = 5.0;

/// Raw activity for one employee over `[start, end)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct ActivityCounts {
    pub tasks_assigned: i64,
    pub tasks_completed: i64,
    pub tasks_overdue: i64,
    /// Completed tasks that carry actual hours.
    pub tasks_with_hours: i64,
    pub actual_hours: f64,
    pub estimated_hours: f64,
    pub leads_assigned: i64,
    pub leads_contacted: i64,
    pub leads_qualified: i64,
    pub leads_converted: i64,
    pub estimated_deal_value: f64,
    pub won_deal_value: f64,
    pub meetings_scheduled: i64,
    pub meetings_completed: i64,
    pub meetings_cancelled: i64,
    pub clients_managed: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    #[serde(flatten)]
    pub counts: ActivityCounts,
    pub task_completion_rate: f64,
    pub lead_conversion_rate: f64,
    pub meeting_completion_rate: f64,
    /// Actual over estimated hours; 1.0 means on estimate.
    pub time_efficiency: Option<f64>,
    pub avg_task_completion_time: Option<f64>,
    pub performance_score: f64,
    pub rating: Rating,
}

/// Percentage, 0 when there is nothing to divide by.
pub fn rate(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl PerformanceMetrics {
    pub fn from_counts(counts: ActivityCounts) -> Self {
        let task_completion_rate = rate(counts.tasks_completed, counts.tasks_assigned);
        let lead_conversion_rate = rate(counts.leads_converted, counts.leads_assigned);
        let meeting_completion_rate = rate(counts.meetings_completed, counts.meetings_scheduled);

        let time_efficiency =
            (counts.estimated_hours > 0.0).then(|| counts.actual_hours / counts.estimated_hours);
        let avg_task_completion_time = (counts.tasks_with_hours > 0)
            .then(|| counts.actual_hours / counts.tasks_with_hours as f64);

        let mut score = task_completion_rate * TASK_WEIGHT
            + lead_conversion_rate * CONVERSION_WEIGHT
            + meeting_completion_rate * MEETING_WEIGHT;
        if let Some(efficiency) = time_efficiency.filter(|e| *e != 0.0) {
            score += (100.0 - (efficiency - 1.0) * 50.0).max(0.0) * EFFICIENCY_WEIGHT;
        }
        let overdue_share = counts.tasks_overdue as f64 / counts.tasks_assigned.max(1) as f64;
        score -= overdue_share * 100.0 * OVERDUE_WEIGHT;
        let performance_score = round2(score.clamp(0.0, 100.0));

        Self {
            counts,
            task_completion_rate: round2(task_completion_rate),
            lead_conversion_rate: round2(lead_conversion_rate),
            meeting_completion_rate: round2(meeting_completion_rate),
            time_efficiency: time_efficiency.map(round2),
            avg_task_completion_time: avg_task_completion_time.map(round2),
            performance_score,
            rating: Rating::from_score(performance_score),
        }
    }
}

/// Compares the latest period's score against the one before it.
pub fn trend(latest: f64, previous: f64) -> Trend {
    if latest > previous + TREND_BAND {
        Trend::Improving
    } else if latest < previous - TREND_BAND {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Month-to-date roll-up across the team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamOverview {
    pub total_employees: usize,
    pub average_performance_score: f64,
    pub top_performer: Option<String>,
    pub employees_needing_attention: Vec<String>,
    pub team_task_completion_rate: f64,
    pub team_lead_conversion_rate: f64,
    pub total_revenue_generated: f64,
}

impl TeamOverview {
    /// Scores under this mark put an employee on the attention list.
    pub const ATTENTION_THRESHOLD: f64 = 70.0;

    pub fn from_members(members: &[(String, PerformanceMetrics)]) -> Self {
        if members.is_empty() {
            return Self {
                total_employees: 0,
                average_performance_score: 0.0,
                top_performer: None,
                employees_needing_attention: Vec::new(),
                team_task_completion_rate: 0.0,
                team_lead_conversion_rate: 0.0,
                total_revenue_generated: 0.0,
            };
        }

        let sum = |f: fn(&ActivityCounts) -> i64| -> i64 {
            members.iter().map(|(_, m)| f(&m.counts)).sum()
        };
        let total_score: f64 = members.iter().map(|(_, m)| m.performance_score).sum();
        // Ties go to the earliest member.
        let top_performer = members
            .iter()
            .reduce(|best, m| {
                if m.1.performance_score > best.1.performance_score {
                    m
                } else {
                    best
                }
            })
            .map(|(name, _)| name.clone());
        let employees_needing_attention = members
            .iter()
            .filter(|(_, m)| m.performance_score < Self::ATTENTION_THRESHOLD)
            .map(|(name, _)| name.clone())
            .collect();

        Self {
            total_employees: members.len(),
            average_performance_score: round2(total_score / members.len() as f64),
            top_performer,
            employees_needing_attention,
            team_task_completion_rate: round2(rate(
                sum(|c| c.tasks_completed),
                sum(|c| c.tasks_assigned),
            )),
            team_lead_conversion_rate: round2(rate(
                sum(|c| c.leads_converted),
                sum(|c| c.leads_assigned),
            )),
            total_revenue_generated: round2(
                members.iter().map(|(_, m)| m.counts.won_deal_value).sum(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> ActivityCounts {
        ActivityCounts {
            tasks_assigned: 10,
            tasks_completed: 8,
            tasks_overdue: 1,
            tasks_with_hours: 8,
            actual_hours: 44.0,
            estimated_hours: 40.0,
            leads_assigned: 4,
            leads_contacted: 4,
            leads_qualified: 3,
            leads_converted: 2,
            estimated_deal_value: 20_000.0,
            won_deal_value: 12_500.0,
            meetings_scheduled: 5,
            meetings_completed: 4,
            meetings_cancelled: 1,
            clients_managed: 3,
        }
    }

    #[test]
    fn test_rate_handles_empty_denominator() {
        assert_eq!(rate(3, 0), 0.0);
        assert_eq!(rate(1, 4), 25.0);
    }

    #[test]
    fn test_weighted_score() {
        let m = PerformanceMetrics::from_counts(counts());
        assert_eq!(m.task_completion_rate, 80.0);
        assert_eq!(m.lead_conversion_rate, 50.0);
        assert_eq!(m.meeting_completion_rate, 80.0);
        assert_eq!(m.time_efficiency, Some(1.1));
        assert_eq!(m.avg_task_completion_time, Some(5.5));
        // 24 + 12.5 + 16 + 0.15 * 95 - 1
        assert!((m.performance_score - 65.75).abs() < 1e-9);
        assert_eq!(m.rating, Rating::NeedsImprovement);
    }

    #[test]
    fn test_no_estimates_skips_efficiency() {
        let m = PerformanceMetrics::from_counts(ActivityCounts {
            estimated_hours: 0.0,
            ..counts()
        });
        assert_eq!(m.time_efficiency, None);
        assert!((m.performance_score - 51.5).abs() < 1e-9);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let m = PerformanceMetrics::from_counts(ActivityCounts {
            tasks_assigned: 3,
            tasks_overdue: 3,
            ..ActivityCounts::default()
        });
        assert_eq!(m.performance_score, 0.0);
        assert_eq!(m.rating, Rating::Poor);
    }

    #[test]
    fn test_strong_month_rates_excellent() {
        let m = PerformanceMetrics::from_counts(ActivityCounts {
            tasks_assigned: 2,
            tasks_completed: 2,
            tasks_with_hours: 2,
            actual_hours: 1.0,
            estimated_hours: 10.0,
            leads_assigned: 1,
            leads_converted: 1,
            meetings_scheduled: 1,
            meetings_completed: 1,
            ..ActivityCounts::default()
        });
        // 30 + 25 + 20 + 0.15 * 145
        assert!((m.performance_score - 96.75).abs() < 1e-9);
        assert_eq!(m.rating, Rating::Excellent);
    }

    #[test]
    fn test_trend_band() {
        assert_eq!(trend(80.0, 70.0), Trend::Improving);
        assert_eq!(trend(75.0, 70.0), Trend::Stable);
        assert_eq!(trend(64.9, 70.0), Trend::Declining);
    }

    #[test]
    fn test_team_overview_empty() {
        let overview = TeamOverview::from_members(&[]);
        assert_eq!(overview.total_employees, 0);
        assert!(overview.top_performer.is_none());
        assert_eq!(overview.average_performance_score, 0.0);
    }

    #[test]
    fn test_team_overview_rolls_up_members() {
        let strong = PerformanceMetrics::from_counts(ActivityCounts {
            estimated_hours: 44.0,
            leads_converted: 4,
            ..counts()
        });
        let weak = PerformanceMetrics::from_counts(ActivityCounts::default());
        let overview = TeamOverview::from_members(&[
            ("Ava".to_string(), strong),
            ("Ben".to_string(), weak),
        ]);
        assert_eq!(overview.total_employees, 2);
        assert_eq!(overview.top_performer.as_deref(), Some("Ava"));
        assert_eq!(overview.employees_needing_attention, vec!["Ben".to_string()]);
        assert_eq!(overview.team_task_completion_rate, 80.0);
        assert_eq!(overview.team_lead_conversion_rate, 100.0);
        assert_eq!(overview.total_revenue_generated, 12_500.0);
    }

    #[test]
    fn test_top_performer_tie_goes_to_first_listed() {
        let same = PerformanceMetrics::from_counts(counts());
        let overview = TeamOverview::from_members(&[
            ("Cleo".to_string(), same.clone()),
            ("Dev".to_string(), same.clone()),
            ("Eli".to_string(), same),
        ]);
        assert_eq!(overview.top_performer.as_deref(), Some("Cleo"));
    }
}
