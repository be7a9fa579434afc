use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::leads::ensure_user_exists;
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::task::{Task, TaskStatus, TASK_SELECT};
use crate::models::Priority;
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct TaskStats {
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub task_type: Option<String>,
    pub assigned_to_id: Option<Uuid>,
}

fn default_task_type() -> String {
    "general".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_task_type")]
    pub task_type: String,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to_id: Uuid,
    pub client_id: Option<Uuid>,
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub task_type: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
}

impl UpdateTaskRequest {
    /// Employees may only report progress and hours.
    fn touches_admin_fields(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.task_type.is_some()
            || self.priority.is_some()
            || self.due_date.is_some()
            || self.assigned_to_id.is_some()
            || self.client_id.is_some()
            || self.estimated_hours.is_some()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Task {id} not found"))
}

fn validate_hours(hours: Option<f64>) -> Result<(), AppError> {
    match hours {
        Some(h) if !h.is_finite() || h < 0.0 => Err(AppError::Validation(
            "Hours must be a non-negative number".to_string(),
        )),
        _ => Ok(()),
    }
}

async fn fetch_task(pool: &PgPool, id: Uuid) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(&format!("{TASK_SELECT} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
}

pub(crate) async fn ensure_client_exists(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Client {id} not found")))
    }
}

/// GET /api/v1/tasks/stats
pub async fn handle_task_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<TaskStats>, AppError> {
    let stats = sqlx::query_as::<_, TaskStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = 'todo') AS todo,
            COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
            COUNT(*) FILTER (WHERE status = 'completed') AS completed,
            COUNT(*) FILTER (WHERE due_date < NOW() AND status <> 'completed') AS overdue
        FROM tasks
        WHERE ($1::uuid IS NULL OR assigned_to_id = $1)
        "#,
    )
    .bind(user.scope())
    .fetch_one(&state.db)
    .await?;
    Ok(Json(stats))
}

/// GET /api/v1/tasks
pub async fn handle_list_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<TaskListQuery>,
) -> Result<Json<Page<Task>>, AppError> {
    let page = PageRequest::new(q.page, q.per_page)?;
    let assignee = user.scope().or(q.assigned_to_id);
    let status = q.status.map(|s| s.as_str());
    let priority = q.priority.map(|p| p.as_str());

    const FILTER: &str = "($1::uuid IS NULL OR t.assigned_to_id = $1) \
        AND ($2::text IS NULL OR t.status = $2) \
        AND ($3::text IS NULL OR t.priority = $3) \
        AND ($4::text IS NULL OR t.task_type = $4)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM tasks t WHERE {FILTER}"))
        .bind(assignee)
        .bind(status)
        .bind(priority)
        .bind(&q.task_type)
        .fetch_one(&state.db)
        .await?;
    let items = sqlx::query_as::<_, Task>(&format!(
        "{TASK_SELECT} WHERE {FILTER} ORDER BY t.created_at DESC LIMIT $5 OFFSET $6"
    ))
    .bind(assignee)
    .bind(status)
    .bind(priority)
    .bind(&q.task_type)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(Page::new(items, total, page)))
}

/// POST /api/v1/tasks
pub async fn handle_create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    user.require_admin()?;
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Task title must not be empty".to_string()));
    }
    validate_hours(req.estimated_hours)?;
    ensure_user_exists(&state.db, req.assigned_to_id).await?;
    if let Some(client_id) = req.client_id {
        ensure_client_exists(&state.db, client_id).await?;
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO tasks
            (id, title, description, task_type, status, priority, due_date,
             assigned_to_id, created_by_id, client_id, estimated_hours)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(&req.task_type)
    .bind(TaskStatus::Todo.as_str())
    .bind(req.priority.as_str())
    .bind(req.due_date)
    .bind(req.assigned_to_id)
    .bind(user.id)
    .bind(req.client_id)
    .bind(req.estimated_hours)
    .execute(&state.db)
    .await?;

    info!("Task {id} assigned to {}", req.assigned_to_id);
    Ok((StatusCode::CREATED, Json(fetch_task(&state.db, id).await?)))
}

/// GET /api/v1/tasks/:id
pub async fn handle_get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    let task = fetch_task(&state.db, id).await?;
    user.require_admin_or(Some(task.assigned_to_id))?;
    Ok(Json(task))
}

/// `completed_at` to store for a transition to `status`: stamped on entering
/// `completed`, cleared when leaving it, untouched otherwise.
fn completion_stamp(
    current: &str,
    next: Option<TaskStatus>,
    now: DateTime<Utc>,
) -> Option<Option<DateTime<Utc>>> {
    let was_completed = current == TaskStatus::Completed.as_str();
    match next {
        Some(TaskStatus::Completed) if !was_completed => Some(Some(now)),
        Some(status) if status != TaskStatus::Completed && was_completed => Some(None),
        _ => None,
    }
}

/// PUT /api/v1/tasks/:id
pub async fn handle_update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let task = fetch_task(&state.db, id).await?;
    user.require_admin_or(Some(task.assigned_to_id))?;
    if !user.is_admin() && req.touches_admin_fields() {
        return Err(AppError::Forbidden(
            "Employees may only update status and actual hours".to_string(),
        ));
    }
    validate_hours(req.estimated_hours)?;
    validate_hours(req.actual_hours)?;
    if let Some(assignee) = req.assigned_to_id {
        ensure_user_exists(&state.db, assignee).await?;
    }
    if let Some(client_id) = req.client_id {
        ensure_client_exists(&state.db, client_id).await?;
    }

    let stamp = completion_stamp(&task.status, req.status, Utc::now());
    sqlx::query(
        r#"
        UPDATE tasks SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            task_type = COALESCE($4, task_type),
            status = COALESCE($5, status),
            priority = COALESCE($6, priority),
            due_date = COALESCE($7, due_date),
            assigned_to_id = COALESCE($8, assigned_to_id),
            client_id = COALESCE($9, client_id),
            estimated_hours = COALESCE($10, estimated_hours),
            actual_hours = COALESCE($11, actual_hours),
            completed_at = CASE WHEN $12 THEN $13 ELSE completed_at END,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(req.title.as_deref().map(str::trim))
    .bind(&req.description)
    .bind(&req.task_type)
    .bind(req.status.map(|s| s.as_str()))
    .bind(req.priority.map(|p| p.as_str()))
    .bind(req.due_date)
    .bind(req.assigned_to_id)
    .bind(req.client_id)
    .bind(req.estimated_hours)
    .bind(req.actual_hours)
    .bind(stamp.is_some())
    .bind(stamp.flatten())
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_task(&state.db, id).await?))
}

/// DELETE /api/v1/tasks/:id
pub async fn handle_delete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require_admin()?;
    let deleted = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
