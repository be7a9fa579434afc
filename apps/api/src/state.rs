use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::ai::ScriptWriter;
use crate::config::Config;
use crate::jobs::JobQueue;
use crate::trending::{TrendAnalyst, TrendingService};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis-backed queue for emails and reminders.
    pub jobs: JobQueue,
    /// Report storage.
    pub s3: S3Client,
    pub config: Config,
    pub trending: Arc<TrendingService>,
    /// LLM enrichment with deterministic fallbacks. Disabled without a Groq key.
    pub analyst: TrendAnalyst,
    /// Video scripts, model-written when the analyst is enabled.
    pub scripts: ScriptWriter,
}
