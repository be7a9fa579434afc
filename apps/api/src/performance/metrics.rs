use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ActivityCounts, PerformanceMetrics};
use crate::errors::AppError;
use crate::models::lead::LeadStatus;

fn status_list(statuses: &[LeadStatus]) -> Vec<&'static str> {
    statuses.iter().map(|s| s.as_str()).collect()
}

/// Loads raw activity for `employee_id` over `[start, end)`.
///
/// Work is attributed to the period it was created in; "overdue" is judged
/// against `now` so that closed periods still reflect what was left undone.
pub async fn load_counts(
    pool: &PgPool,
    employee_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<ActivityCounts, AppError> {
    let counts = sqlx::query_as::<_, ActivityCounts>(
        r#"
        WITH t AS (
            SELECT * FROM tasks
            WHERE assigned_to_id = $1 AND created_at >= $2 AND created_at < $3
        ), l AS (
            SELECT * FROM leads
            WHERE assigned_to_id = $1 AND created_at >= $2 AND created_at < $3
        ), m AS (
            SELECT * FROM meetings
            WHERE assigned_to_id = $1 AND created_at >= $2 AND created_at < $3
        )
        SELECT
            (SELECT COUNT(*) FROM t) AS tasks_assigned,
            (SELECT COUNT(*) FROM t WHERE status = 'completed') AS tasks_completed,
            (SELECT COUNT(*) FROM t WHERE due_date < $4 AND status <> 'completed') AS tasks_overdue,
            (SELECT COUNT(*) FROM t
              WHERE status = 'completed' AND actual_hours IS NOT NULL) AS tasks_with_hours,
            (SELECT COALESCE(SUM(actual_hours), 0)::float8 FROM t
              WHERE status = 'completed' AND actual_hours IS NOT NULL) AS actual_hours,
            (SELECT COALESCE(SUM(estimated_hours), 0)::float8 FROM t
              WHERE status = 'completed' AND actual_hours IS NOT NULL) AS estimated_hours,
            (SELECT COUNT(*) FROM l) AS leads_assigned,
            (SELECT COUNT(*) FROM l WHERE status = ANY($5)) AS leads_contacted,
            (SELECT COUNT(*) FROM l WHERE status = ANY($6)) AS leads_qualified,
            (SELECT COUNT(*) FROM l WHERE status = ANY($7)) AS leads_converted,
            (SELECT COALESCE(SUM(estimated_value), 0)::float8 FROM l) AS estimated_deal_value,
            (SELECT COALESCE(SUM(estimated_value), 0)::float8 FROM l
              WHERE status = ANY($7)) AS won_deal_value,
            (SELECT COUNT(*) FROM m) AS meetings_scheduled,
            (SELECT COUNT(*) FROM m WHERE status = 'completed') AS meetings_completed,
            (SELECT COUNT(*) FROM m WHERE status = 'cancelled') AS meetings_cancelled,
            (SELECT COUNT(*) FROM clients
              WHERE owner_id = $1 AND created_at >= $2 AND created_at < $3) AS clients_managed
        "#,
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .bind(now)
    .bind(status_list(LeadStatus::CONTACTED))
    .bind(status_list(LeadStatus::QUALIFIED))
    .bind(status_list(LeadStatus::WON))
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

pub async fn calculate(
    pool: &PgPool,
    employee_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<PerformanceMetrics, AppError> {
    let counts = load_counts(pool, employee_id, start, end, now).await?;
    Ok(PerformanceMetrics::from_counts(counts))
}

/// Half-open window covering the calendar month before `now`'s month.
pub fn previous_month(now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let end = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()?;
    let (year, month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };
    let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
    Some((start, end))
}

/// `(latest, previous)` back-to-back windows of `days` each, ending at `now`.
pub fn rolling_windows(
    now: DateTime<Utc>,
    days: i64,
) -> ((DateTime<Utc>, DateTime<Utc>), (DateTime<Utc>, DateTime<Utc>)) {
    let split = now - Duration::days(days);
    ((split, now), (split - Duration::days(days), split))
}
