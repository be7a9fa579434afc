use axum::extract::State;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::metrics::{calculate, previous_month, rolling_windows};
use super::{trend, PerformanceMetrics, TeamOverview};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::meeting::MeetingStatus;
use crate::models::performance::{PerformanceSnapshot, Trend};
use crate::models::task::TaskStatus;
use crate::models::user::{Role, User};
use crate::routes::dashboard::month_start;
use crate::state::AppState;

const DEFAULT_HISTORY_MONTHS: i64 = 6;
const MAX_HISTORY_MONTHS: i64 = 24;
const RECENT_ACTIVITY_DAYS: i64 = 7;
const TREND_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct EmployeePerformanceSummary {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub current_period: PerformanceMetrics,
    pub active_tasks: i64,
    pub pending_meetings: i64,
    pub recent_activity_score: f64,
    pub performance_trend: Trend,
    pub last_30_days_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub months: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EmployeePerformanceDetail {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub current_period: PerformanceMetrics,
    pub history: Vec<PerformanceSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyCalculationResponse {
    pub message: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created: u64,
}

fn history_months(months: Option<i64>) -> Result<i64, AppError> {
    let months = months.unwrap_or(DEFAULT_HISTORY_MONTHS);
    if !(1..=MAX_HISTORY_MONTHS).contains(&months) {
        return Err(AppError::Validation(format!(
            "months must be between 1 and {MAX_HISTORY_MONTHS}"
        )));
    }
    Ok(months)
}

async fn active_employees(pool: &PgPool) -> Result<Vec<User>, AppError> {
    let employees = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE role = $1 AND is_active ORDER BY full_name, email",
    )
    .bind(Role::Employee.as_str())
    .fetch_all(pool)
    .await?;
    Ok(employees)
}

/// GET /api/v1/performance/team-overview
pub async fn handle_team_overview(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<TeamOverview>, AppError> {
    user.require_admin()?;
    let now = Utc::now();
    let since = month_start(now)?;

    let mut members = Vec::new();
    for employee in active_employees(&state.db).await? {
        let metrics = calculate(&state.db, employee.id, since, now, now).await?;
        members.push((employee.display_name().to_string(), metrics));
    }
    Ok(Json(TeamOverview::from_members(&members)))
}

async fn summarize(
    pool: &PgPool,
    employee: &User,
    now: DateTime<Utc>,
) -> Result<EmployeePerformanceSummary, AppError> {
    let current_period = calculate(pool, employee.id, month_start(now)?, now, now).await?;
    let recent = calculate(
        pool,
        employee.id,
        now - Duration::days(RECENT_ACTIVITY_DAYS),
        now,
        now,
    )
    .await?;
    let ((latest_start, latest_end), (prev_start, prev_end)) =
        rolling_windows(now, TREND_WINDOW_DAYS);
    let latest = calculate(pool, employee.id, latest_start, latest_end, now).await?;
    let previous = calculate(pool, employee.id, prev_start, prev_end, now).await?;

    let active: Vec<&str> = TaskStatus::ACTIVE.iter().map(|s| s.as_str()).collect();
    let active_tasks: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tasks WHERE assigned_to_id = $1 AND status = ANY($2)",
    )
    .bind(employee.id)
    .bind(active)
    .fetch_one(pool)
    .await?;
    let pending_meetings: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM meetings WHERE assigned_to_id = $1 AND status = $2 AND start_time >= $3",
    )
    .bind(employee.id)
    .bind(MeetingStatus::Scheduled.as_str())
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(EmployeePerformanceSummary {
        employee_id: employee.id,
        employee_name: employee.display_name().to_string(),
        current_period,
        active_tasks,
        pending_meetings,
        recent_activity_score: recent.performance_score,
        performance_trend: trend(latest.performance_score, previous.performance_score),
        last_30_days_score: latest.performance_score,
    })
}

/// GET /api/v1/performance/employees
pub async fn handle_employee_summaries(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<EmployeePerformanceSummary>>, AppError> {
    user.require_admin()?;
    let now = Utc::now();
    let mut summaries = Vec::new();
    for employee in active_employees(&state.db).await? {
        summaries.push(summarize(&state.db, &employee, now).await?);
    }
    Ok(Json(summaries))
}

/// GET /api/v1/performance/employee/:id
pub async fn handle_employee_performance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<EmployeePerformanceDetail>, AppError> {
    user.require_admin()?;
    let months = history_months(q.months)?;

    let employee = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND role = $2")
        .bind(id)
        .bind(Role::Employee.as_str())
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))?;

    let now = Utc::now();
    let current_period = calculate(&state.db, id, month_start(now)?, now, now).await?;
    let history = sqlx::query_as::<_, PerformanceSnapshot>(
        "SELECT * FROM employee_performance WHERE employee_id = $1 ORDER BY period_start DESC LIMIT $2",
    )
    .bind(id)
    .bind(months)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(EmployeePerformanceDetail {
        employee_id: id,
        employee_name: employee.display_name().to_string(),
        current_period,
        history,
    }))
}

async fn store_snapshot(
    pool: &PgPool,
    employee_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    m: &PerformanceMetrics,
) -> Result<u64, AppError> {
    let c = &m.counts;
    let inserted = sqlx::query(
        r#"
        INSERT INTO employee_performance (
            id, employee_id, period_start, period_end,
            total_tasks_assigned, tasks_completed, tasks_overdue, avg_task_completion_time,
            total_estimated_hours, total_actual_hours,
            leads_assigned, leads_contacted, leads_qualified, leads_converted,
            total_estimated_deal_value, total_actual_deal_value,
            meetings_scheduled, meetings_completed, meetings_no_show, clients_managed,
            performance_score, rating
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22)
        ON CONFLICT (employee_id, period_start, period_end) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .bind(c.tasks_assigned)
    .bind(c.tasks_completed)
    .bind(c.tasks_overdue)
    .bind(m.avg_task_completion_time)
    .bind(c.estimated_hours)
    .bind(c.actual_hours)
    .bind(c.leads_assigned)
    .bind(c.leads_contacted)
    .bind(c.leads_qualified)
    .bind(c.leads_converted)
    .bind(c.estimated_deal_value)
    .bind(c.won_deal_value)
    .bind(c.meetings_scheduled)
    .bind(c.meetings_completed)
    .bind(c.meetings_cancelled)
    .bind(c.clients_managed)
    .bind(m.performance_score)
    .bind(m.rating.as_str())
    .execute(pool)
    .await?
    .rows_affected();
    Ok(inserted)
}

/// POST /api/v1/performance/calculate-monthly
pub async fn handle_calculate_monthly(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MonthlyCalculationResponse>, AppError> {
    user.require_admin()?;
    let now = Utc::now();
    let (start, end) = previous_month(now)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("No previous month for {now}")))?;

    let mut created = 0;
    for employee in active_employees(&state.db).await? {
        let metrics = calculate(&state.db, employee.id, start, end, now).await?;
        created += store_snapshot(&state.db, employee.id, start, end, &metrics).await?;
    }

    info!("Stored {created} performance snapshots for {}", start.format("%Y-%m"));
    Ok(Json(MonthlyCalculationResponse {
        message: format!("Monthly performance calculated for {created} employees"),
        period_start: start,
        period_end: end,
        created,
    }))
}
