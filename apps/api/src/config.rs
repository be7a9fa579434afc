use std::time::Duration;

use anyhow::{Context, Result};

use crate::trending::aggregator::DEFAULT_SOURCE_TIMEOUT;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    /// Groq key for trend enrichment. `None` disables every LLM call.
    pub groq_api_key: Option<String>,
    pub enable_llm_analysis: bool,
    pub cors_allowed_origins: Vec<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub jobs: JobSettings,
    pub trending_source_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

/// Intervals for the background scheduler.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub enabled: bool,
    pub lead_follow_up_interval: Duration,
    pub content_post_interval: Duration,
    pub invoice_reminder_interval: Duration,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            lead_follow_up_interval: Duration::from_secs(2 * 60 * 60),
            content_post_interval: Duration::from_secs(15 * 60),
            invoice_reminder_interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = JobSettings::default();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            jwt_secret: require_env("JWT_SECRET")?,
            access_token_expire_minutes: parse_env("ACCESS_TOKEN_EXPIRE_MINUTES", 60 * 24 * 8)?,
            groq_api_key: optional_env("GROQ_API_KEY"),
            enable_llm_analysis: parse_env("ENABLE_LLM_ANALYSIS", true)?,
            cors_allowed_origins: optional_env("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            admin_email: optional_env("ADMIN_EMAIL"),
            admin_password: optional_env("ADMIN_PASSWORD"),
            jobs: JobSettings {
                enabled: parse_env("ENABLE_BACKGROUND_JOBS", defaults.enabled)?,
                lead_follow_up_interval: interval_env(
                    "LEAD_FOLLOW_UP_INTERVAL_SECS",
                    defaults.lead_follow_up_interval,
                )?,
                content_post_interval: interval_env(
                    "CONTENT_POST_INTERVAL_SECS",
                    defaults.content_post_interval,
                )?,
                invoice_reminder_interval: interval_env(
                    "INVOICE_REMINDER_INTERVAL_SECS",
                    defaults.invoice_reminder_interval,
                )?,
            },
            trending_source_timeout: Duration::from_secs(parse_env(
                "TRENDING_SOURCE_TIMEOUT_SECS",
                DEFAULT_SOURCE_TIMEOUT.as_secs(),
            )?),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// True when trend enrichment should go to the LLM rather than the fallbacks.
    pub fn llm_enabled(&self) -> bool {
        self.enable_llm_analysis && self.groq_api_key.is_some()
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

/// Scheduler periods must be non-zero; `tokio::time::interval` panics on zero.
fn interval_env(key: &str, default: Duration) -> Result<Duration> {
    positive_secs(key, parse_env(key, default.as_secs())?)
}

fn positive_secs(key: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        anyhow::bail!("Environment variable '{key}' must be at least 1 second");
    }
    Ok(Duration::from_secs(secs))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        let origins = split_list(" http://localhost:3000, ,http://localhost:3001 ");
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "http://localhost:3001"]
        );
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = positive_secs("LEAD_FOLLOW_UP_INTERVAL_SECS", 0).unwrap_err();
        assert!(err.to_string().contains("LEAD_FOLLOW_UP_INTERVAL_SECS"));
        assert_eq!(
            positive_secs("CONTENT_POST_INTERVAL_SECS", 30).unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_job_defaults_match_schedule() {
        let jobs = JobSettings::default();
        assert_eq!(jobs.lead_follow_up_interval.as_secs(), 7200);
        assert_eq!(jobs.content_post_interval.as_secs(), 900);
        assert_eq!(jobs.invoice_reminder_interval.as_secs(), 86400);
    }
}
