use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(TaskStatus {
    Todo => "todo",
    InProgress => "in_progress",
    Review => "review",
    Completed => "completed",
    Blocked => "blocked",
});

impl TaskStatus {
    /// Work the assignee is actively carrying; blocked tasks are excluded.
    pub const ACTIVE: &'static [TaskStatus] =
        &[TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Review];
}

/// Task row joined with assignee and client names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub task_type: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to_id: Uuid,
    pub created_by_id: Uuid,
    pub client_id: Option<Uuid>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_to_name: Option<String>,
    pub client_name: Option<String>,
}

pub const TASK_SELECT: &str = "SELECT t.*, u.full_name AS assigned_to_name, c.name AS client_name \
     FROM tasks t \
     LEFT JOIN users u ON u.id = t.assigned_to_id \
     LEFT JOIN clients c ON c.id = t.client_id";
