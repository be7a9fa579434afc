use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::compose::{compose_report, report_title};
use super::render::render_pdf;
use super::storage::{get_report, put_report, report_key};
use super::{report_filename, validate_filename};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path};
use crate::state::AppState;
use crate::trending::handlers::{build_discovery, DiscoverTopicsRequest};

#[derive(Debug, Serialize)]
pub struct ReportInfo {
    pub filename: String,
    pub file_size_kb: f64,
    pub topics_count: usize,
    pub generated_at: DateTime<Utc>,
    pub field: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub status: &'static str,
    pub message: String,
    pub report_info: ReportInfo,
}

fn size_kb(bytes: usize) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

/// POST /api/v1/content/generate-pdf-report
pub async fn handle_generate_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<DiscoverTopicsRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    let now = Utc::now();
    let discovery = build_discovery(&state.trending, &state.analyst, &req, now).await?;
    let field = discovery.market_insights.field_analyzed.clone();
    let recommendations = state
        .analyst
        .strategic_recommendations(&discovery.trending_topics, &field)
        .await
        .value;

    let blocks = compose_report(&discovery, &recommendations, user.display_name(), now);
    let title = report_title(&field);
    let pdf = tokio::task::spawn_blocking(move || render_pdf(&title, &blocks))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Report rendering task failed: {e}")))??;

    let filename = report_filename(&field, user.display_name(), now);
    let file_size_kb = size_kb(pdf.len());
    put_report(
        &state.s3,
        &state.config.s3_bucket,
        &report_key(user.id, &filename),
        pdf,
    )
    .await?;

    info!(user_id = %user.id, %filename, file_size_kb, "Generated PDF report");
    Ok(Json(ReportResponse {
        status: "success",
        message: format!("PDF report generated for {field}"),
        report_info: ReportInfo {
            filename,
            file_size_kb,
            topics_count: discovery.trending_topics.len(),
            generated_at: now,
            field,
        },
    }))
}

/// GET /api/v1/content/download-pdf-report/:filename
pub async fn handle_download_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    validate_filename(&filename)?;
    let pdf = get_report(
        &state.s3,
        &state.config.s3_bucket,
        &report_key(user.id, &filename),
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Report {filename} not found")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_kb_rounds_to_two_places() {
        assert!((size_kb(1536) - 1.5).abs() < 1e-9);
        assert!((size_kb(1000) - 0.98).abs() < 1e-9);
        assert_eq!(size_kb(0), 0.0);
    }
}
