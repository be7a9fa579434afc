mod ai;
mod analytics;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod jobs;
mod llm_client;
mod models;
mod pagination;
mod performance;
mod reports;
mod routes;
mod state;
#[cfg(test)]
mod test_support;
mod trending;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai::ScriptWriter;
use crate::auth::handlers::bootstrap_admin;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::jobs::mailer::LogMailer;
use crate::jobs::scheduler::spawn_scheduler;
use crate::jobs::social::StubPublisher;
use crate::jobs::worker::run_worker;
use crate::jobs::JobQueue;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::trending::sources::default_sources;
use crate::trending::{TrendAnalyst, TrendingService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Opsdesk API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;
    bootstrap_admin(&db, &config).await?;

    // Redis job queue
    let redis = redis::Client::open(config.redis_url.clone())?;
    let jobs = JobQueue::new(redis);
    info!("Redis job queue initialized");

    // S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // LLM enrichment
    let llm = match &config.groq_api_key {
        Some(key) if config.llm_enabled() => {
            info!("LLM analysis enabled (model: {})", llm_client::MODEL);
            Some(LlmClient::new(key.clone()))
        }
        _ => {
            info!("LLM analysis disabled; using deterministic fallbacks");
            None
        }
    };
    let scripts = ScriptWriter::new(llm.clone());
    let analyst = TrendAnalyst::new(llm);

    // Trend sources
    let http = reqwest::Client::builder()
        .user_agent(concat!("opsdesk/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client for trend sources")?;
    let trending = Arc::new(TrendingService::new(
        default_sources(http),
        config.trending_source_timeout,
    ));

    // Background jobs
    if config.jobs.enabled {
        tokio::spawn(run_worker(db.clone(), jobs.clone(), Arc::new(LogMailer)));
        spawn_scheduler(db.clone(), jobs.clone(), Arc::new(StubPublisher), &config.jobs);
        info!("Background worker and scheduler started");
    } else {
        warn!("Background jobs disabled; queued jobs will not be processed");
    }

    let state = AppState {
        db,
        jobs,
        s3,
        config: config.clone(),
        trending,
        analyst,
        scripts,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Permissive unless `CORS_ALLOWED_ORIGINS` names the allowed origins.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "opsdesk-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
