use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(PostStatus {
    Draft => "draft",
    Scheduled => "scheduled",
    Published => "published",
    Failed => "failed",
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContentPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub platform: String,
    pub status: String,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub external_post_id: Option<String>,
    pub ai_generated: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
