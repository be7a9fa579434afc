use axum::extract::State;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::Json;
use crate::state::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub active_clients: i64,
    pub pending_tasks: i64,
    pub new_leads: i64,
    pub revenue_this_month: f64,
    pub content_posts_scheduled: i64,
}

/// Midnight UTC on the first of `now`'s month.
pub(crate) fn month_start(now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Invalid month start for {now}")))
}

/// GET /api/v1/dashboard/stats
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardStats>, AppError> {
    let since = month_start(Utc::now())?;
    let stats = sqlx::query_as::<_, DashboardStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM clients
              WHERE $1::uuid IS NULL OR owner_id = $1) AS total_clients,
            (SELECT COUNT(*) FROM clients
              WHERE ($1::uuid IS NULL OR owner_id = $1) AND status = 'active') AS active_clients,
            (SELECT COUNT(*) FROM tasks
              WHERE ($1::uuid IS NULL OR assigned_to_id = $1)
                AND status IN ('todo', 'in_progress')) AS pending_tasks,
            (SELECT COUNT(*) FROM leads
              WHERE ($1::uuid IS NULL OR assigned_to_id = $1) AND status = 'new') AS new_leads,
            (SELECT COALESCE(SUM(amount), 0)::float8 FROM invoices
              WHERE ($1::uuid IS NULL OR user_id = $1)
                AND status = 'paid' AND paid_date >= $2) AS revenue_this_month,
            (SELECT COUNT(*) FROM content_posts
              WHERE ($1::uuid IS NULL OR user_id = $1) AND status = 'scheduled') AS content_posts_scheduled
        "#,
    )
    .bind(user.scope())
    .bind(since)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(stats))
}
