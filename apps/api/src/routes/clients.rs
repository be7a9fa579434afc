use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::auth::handlers::{normalize_email, validate_email};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::client::{
    Client, ClientStatus, OnboardingStage, PortalSubmission, SubmissionStatus,
};
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct ClientStats {
    pub total: i64,
    pub active: i64,
    pub pending: i64,
    pub completed: i64,
}

#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub status: Option<ClientStatus>,
    pub onboarding_stage: Option<OnboardingStage>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub status: Option<ClientStatus>,
    pub onboarding_stage: Option<OnboardingStage>,
}

#[derive(Debug, Serialize)]
pub struct PortalInfo {
    pub client_name: String,
    pub company: Option<String>,
    pub portal_active: bool,
}

fn default_contact_method() -> String {
    "email".to_string()
}

fn default_urgency() -> String {
    "medium".to_string()
}

#[derive(Debug, Deserialize)]
pub struct PortalSubmissionRequest {
    pub project_requirements: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub additional_info: Option<String>,
    #[serde(default = "default_contact_method")]
    pub preferred_contact_method: String,
    #[serde(default = "default_urgency")]
    pub urgency_level: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionStatusRequest {
    pub status: SubmissionStatus,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Client {id} not found"))
}

/// `%term%` for ILIKE, with the wildcard characters in `term` escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

async fn fetch_owned(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<Client, AppError> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn email_taken(
    pool: &PgPool,
    owner_id: Uuid,
    email: &str,
    except: Option<Uuid>,
) -> Result<bool, AppError> {
    let taken = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM clients WHERE owner_id = $1 AND email = $2 AND ($3::uuid IS NULL OR id <> $3))",
    )
    .bind(owner_id)
    .bind(email)
    .bind(except)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

/// GET /api/v1/clients/stats
pub async fn handle_client_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ClientStats>, AppError> {
    let stats = sqlx::query_as::<_, ClientStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = 'active') AS active,
            COUNT(*) FILTER (WHERE status = 'pending') AS pending,
            COUNT(*) FILTER (WHERE status = 'completed') AS completed
        FROM clients WHERE owner_id = $1
        "#,
    )
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(stats))
}

/// POST /api/v1/clients
pub async fn handle_create_client(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Client name must not be empty".to_string()));
    }
    let email = normalize_email(&req.email);
    validate_email(&email)?;
    if email_taken(&state.db, user.id, &email, None).await? {
        return Err(AppError::Conflict(
            "A client with this email already exists".to_string(),
        ));
    }

    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (id, name, email, phone, company, status, onboarding_stage, notes, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(&email)
    .bind(&req.phone)
    .bind(&req.company)
    .bind(req.status.unwrap_or(ClientStatus::Pending).as_str())
    .bind(req.onboarding_stage.unwrap_or(OnboardingStage::Initial).as_str())
    .bind(&req.notes)
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    info!("Client {} created by {}", client.id, user.id);
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/v1/clients
pub async fn handle_list_clients(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<ClientListQuery>,
) -> Result<Json<Page<Client>>, AppError> {
    let page = PageRequest::new(q.page, q.per_page)?;
    let search = q
        .search
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(like_pattern);
    let status = q.status.map(|s| s.as_str());

    const FILTER: &str = "owner_id = $1 \
        AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2 OR company ILIKE $2) \
        AND ($3::text IS NULL OR status = $3)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM clients WHERE {FILTER}"))
        .bind(user.id)
        .bind(&search)
        .bind(status)
        .fetch_one(&state.db)
        .await?;
    let items = sqlx::query_as::<_, Client>(&format!(
        "SELECT * FROM clients WHERE {FILTER} ORDER BY created_at DESC LIMIT $4 OFFSET $5"
    ))
    .bind(user.id)
    .bind(&search)
    .bind(status)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(Page::new(items, total, page)))
}

/// GET /api/v1/clients/:id
pub async fn handle_get_client(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    Ok(Json(fetch_owned(&state.db, id, user.id).await?))
}

/// PUT /api/v1/clients/:id
pub async fn handle_update_client(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClientRequest>,
) -> Result<Json<Client>, AppError> {
    fetch_owned(&state.db, id, user.id).await?;

    let email = match req.email.as_deref() {
        Some(raw) => {
            let email = normalize_email(raw);
            validate_email(&email)?;
            if email_taken(&state.db, user.id, &email, Some(id)).await? {
                return Err(AppError::Conflict(
                    "A client with this email already exists".to_string(),
                ));
            }
            Some(email)
        }
        None => None,
    };
    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Client name must not be empty".to_string()));
    }

    let client = sqlx::query_as::<_, Client>(
        r#"
        UPDATE clients SET
            name = COALESCE($3, name),
            email = COALESCE($4, email),
            phone = COALESCE($5, phone),
            company = COALESCE($6, company),
            notes = COALESCE($7, notes),
            status = COALESCE($8, status),
            onboarding_stage = COALESCE($9, onboarding_stage),
            updated_at = NOW()
        WHERE id = $1 AND owner_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user.id)
    .bind(req.name.as_deref().map(str::trim))
    .bind(&email)
    .bind(&req.phone)
    .bind(&req.company)
    .bind(&req.notes)
    .bind(req.status.map(|s| s.as_str()))
    .bind(req.onboarding_stage.map(|s| s.as_str()))
    .fetch_one(&state.db)
    .await?;
    Ok(Json(client))
}

/// DELETE /api/v1/clients/:id
pub async fn handle_delete_client(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = sqlx::query("DELETE FROM clients WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(user.id)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(not_found(id));
    }
    info!("Client {id} deleted by {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Client portal
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/clients/portal/:id/info (public)
pub async fn handle_portal_info(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PortalInfo>, AppError> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(PortalInfo {
        client_name: client.name,
        company: client.company,
        portal_active: true,
    }))
}

/// POST /api/v1/clients/portal/:id/submit (public)
pub async fn handle_portal_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PortalSubmissionRequest>,
) -> Result<(StatusCode, Json<PortalSubmission>), AppError> {
    if req.project_requirements.trim().is_empty() {
        return Err(AppError::Validation(
            "project_requirements must not be empty".to_string(),
        ));
    }

    let mut tx = state.db.begin().await?;
    let moved = sqlx::query(
        "UPDATE clients SET status = $2, onboarding_stage = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(ClientStatus::PortalSubmitted.as_str())
    .bind(OnboardingStage::RequirementsSubmitted.as_str())
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if moved == 0 {
        return Err(not_found(id));
    }

    let submission = sqlx::query_as::<_, PortalSubmission>(
        r#"
        INSERT INTO portal_submissions
            (id, client_id, project_requirements, budget_range, timeline, additional_info,
             preferred_contact_method, urgency_level, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(id)
    .bind(req.project_requirements.trim())
    .bind(&req.budget_range)
    .bind(&req.timeline)
    .bind(&req.additional_info)
    .bind(&req.preferred_contact_method)
    .bind(&req.urgency_level)
    .bind(SubmissionStatus::New.as_str())
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("Portal submission {} received for client {id}", submission.id);
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /api/v1/clients/:id/portal-submissions
pub async fn handle_list_submissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PortalSubmission>>, AppError> {
    fetch_owned(&state.db, id, user.id).await?;
    let submissions = sqlx::query_as::<_, PortalSubmission>(
        "SELECT * FROM portal_submissions WHERE client_id = $1 ORDER BY created_at DESC",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(submissions))
}

/// PATCH /api/v1/clients/portal-submissions/:id/status
pub async fn handle_update_submission_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmissionStatusRequest>,
) -> Result<Json<PortalSubmission>, AppError> {
    let submission = sqlx::query_as::<_, PortalSubmission>(
        r#"
        UPDATE portal_submissions s SET status = $3, updated_at = NOW()
        FROM clients c
        WHERE s.id = $1 AND c.id = s.client_id AND c.owner_id = $2
        RETURNING s.*
        "#,
    )
    .bind(id)
    .bind(user.id)
    .bind(req.status.as_str())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Portal submission {id} not found")))?;
    Ok(Json(submission))
}
