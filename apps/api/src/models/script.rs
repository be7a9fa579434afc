use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(ScriptStatus {
    Draft => "draft",
    Generated => "generated",
    VideoCreated => "video_created",
});

text_enum!(
    /// Who wrote the script body.
    ScriptAuthor {
        Model => "llm",
        Template => "template",
    }
);

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AiScript {
    pub id: Uuid,
    pub topic: String,
    pub script_content: String,
    pub video_style: String,
    pub target_duration: i32,
    pub tone: String,
    pub include_hook: bool,
    pub status: String,
    pub generated_by: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
