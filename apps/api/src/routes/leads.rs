use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::auth::handlers::normalize_email;
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::client::{Client, ClientStatus, OnboardingStage};
use crate::models::lead::{Lead, LeadStatus, LEAD_SELECT};
use crate::models::Priority;
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct LeadStats {
    pub total: i64,
    pub new: i64,
    pub qualified: i64,
    pub proposal: i64,
    pub closed_won: i64,
    pub closed_lost: i64,
    pub total_estimated_value: f64,
}

#[derive(Debug, Deserialize)]
pub struct LeadListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<LeadStatus>,
    pub priority: Option<Priority>,
    pub assigned_to_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLeadRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub assigned_to_id: Option<Uuid>,
    pub estimated_value: Option<f64>,
    pub notes: Option<String>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLeadRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub status: Option<LeadStatus>,
    pub priority: Option<Priority>,
    pub assigned_to_id: Option<Uuid>,
    pub estimated_value: Option<f64>,
    pub notes: Option<String>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
}

impl UpdateLeadRequest {
    /// Employees may only move the lead along and keep notes.
    fn touches_admin_fields(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.company.is_some()
            || self.source.is_some()
            || self.priority.is_some()
            || self.assigned_to_id.is_some()
            || self.estimated_value.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub message: String,
    pub client: Client,
    pub lead_id: Uuid,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Lead {id} not found"))
}

async fn fetch_lead(pool: &PgPool, id: Uuid) -> Result<Lead, AppError> {
    sqlx::query_as::<_, Lead>(&format!("{LEAD_SELECT} WHERE l.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
}

pub(crate) async fn ensure_user_exists(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("User {id} not found")))
    }
}

/// GET /api/v1/leads/stats
pub async fn handle_lead_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<LeadStats>, AppError> {
    let stats = sqlx::query_as::<_, LeadStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = 'new') AS "new",
            COUNT(*) FILTER (WHERE status = 'qualified') AS qualified,
            COUNT(*) FILTER (WHERE status = 'proposal') AS proposal,
            COUNT(*) FILTER (WHERE status = 'closed_won') AS closed_won,
            COUNT(*) FILTER (WHERE status = 'closed_lost') AS closed_lost,
            COALESCE(SUM(estimated_value), 0)::float8 AS total_estimated_value
        FROM leads
        WHERE ($1::uuid IS NULL OR assigned_to_id = $1)
        "#,
    )
    .bind(user.scope())
    .fetch_one(&state.db)
    .await?;
    Ok(Json(stats))
}

/// GET /api/v1/leads
pub async fn handle_list_leads(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<LeadListQuery>,
) -> Result<Json<Page<Lead>>, AppError> {
    let page = PageRequest::new(q.page, q.per_page)?;
    // The assignee filter is an admin tool; employees are always pinned to themselves.
    let assignee = user.scope().or(q.assigned_to_id);
    let status = q.status.map(|s| s.as_str());
    let priority = q.priority.map(|p| p.as_str());

    const FILTER: &str = "($1::uuid IS NULL OR l.assigned_to_id = $1) \
        AND ($2::text IS NULL OR l.status = $2) \
        AND ($3::text IS NULL OR l.priority = $3)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM leads l WHERE {FILTER}"))
        .bind(assignee)
        .bind(status)
        .bind(priority)
        .fetch_one(&state.db)
        .await?;
    let items = sqlx::query_as::<_, Lead>(&format!(
        "{LEAD_SELECT} WHERE {FILTER} ORDER BY l.created_at DESC LIMIT $4 OFFSET $5"
    ))
    .bind(assignee)
    .bind(status)
    .bind(priority)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(Page::new(items, total, page)))
}

/// POST /api/v1/leads
pub async fn handle_create_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    user.require_admin()?;
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Lead name must not be empty".to_string()));
    }
    if let Some(assignee) = req.assigned_to_id {
        ensure_user_exists(&state.db, assignee).await?;
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO leads
            (id, name, email, phone, company, source, status, priority, assigned_to_id,
             created_by_id, estimated_value, notes, next_follow_up_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(id)
    .bind(req.name.trim())
    .bind(req.email.as_deref().map(normalize_email))
    .bind(&req.phone)
    .bind(&req.company)
    .bind(&req.source)
    .bind(LeadStatus::New.as_str())
    .bind(req.priority.as_str())
    .bind(req.assigned_to_id)
    .bind(user.id)
    .bind(req.estimated_value)
    .bind(&req.notes)
    .bind(req.next_follow_up_date)
    .execute(&state.db)
    .await?;

    info!("Lead {id} created by {}", user.id);
    Ok((StatusCode::CREATED, Json(fetch_lead(&state.db, id).await?)))
}

/// GET /api/v1/leads/:id
pub async fn handle_get_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Lead>, AppError> {
    let lead = fetch_lead(&state.db, id).await?;
    user.require_admin_or(lead.assigned_to_id)?;
    Ok(Json(lead))
}

/// PUT /api/v1/leads/:id
pub async fn handle_update_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLeadRequest>,
) -> Result<Json<Lead>, AppError> {
    let lead = fetch_lead(&state.db, id).await?;
    user.require_admin_or(lead.assigned_to_id)?;
    if !user.is_admin() && req.touches_admin_fields() {
        return Err(AppError::Forbidden(
            "Employees may only update status, notes and next follow-up date".to_string(),
        ));
    }
    if let Some(assignee) = req.assigned_to_id {
        ensure_user_exists(&state.db, assignee).await?;
    }

    sqlx::query(
        r#"
        UPDATE leads SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            company = COALESCE($5, company),
            source = COALESCE($6, source),
            status = COALESCE($7, status),
            priority = COALESCE($8, priority),
            assigned_to_id = COALESCE($9, assigned_to_id),
            estimated_value = COALESCE($10, estimated_value),
            notes = COALESCE($11, notes),
            next_follow_up_date = COALESCE($12, next_follow_up_date),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(req.name.as_deref().map(str::trim))
    .bind(req.email.as_deref().map(normalize_email))
    .bind(&req.phone)
    .bind(&req.company)
    .bind(&req.source)
    .bind(req.status.map(|s| s.as_str()))
    .bind(req.priority.map(|p| p.as_str()))
    .bind(req.assigned_to_id)
    .bind(req.estimated_value)
    .bind(&req.notes)
    .bind(req.next_follow_up_date)
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_lead(&state.db, id).await?))
}

/// DELETE /api/v1/leads/:id
pub async fn handle_delete_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require_admin()?;
    let deleted = sqlx::query("DELETE FROM leads WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/leads/:id/convert-to-client
pub async fn handle_convert_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ConversionResponse>), AppError> {
    user.require_admin()?;
    let lead = fetch_lead(&state.db, id).await?;
    if lead.status.parse::<LeadStatus>() != Ok(LeadStatus::ClosedWon) {
        return Err(AppError::Validation(
            "Only closed_won leads can be converted".to_string(),
        ));
    }
    let email = lead
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("Lead has no email address".to_string()))?;

    let mut tx = state.db.begin().await?;
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM clients WHERE owner_id = $1 AND email = $2)",
    )
    .bind(user.id)
    .bind(&email)
    .fetch_one(&mut *tx)
    .await?;
    if taken {
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
    .bind(lead.client_name())
    .bind(&email)
    .bind(&lead.phone)
    .bind(&lead.company)
    .bind(ClientStatus::Active.as_str())
    .bind(OnboardingStage::Initial.as_str())
    .bind(format!("Converted from lead {}", lead.name))
    .bind(user.id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE leads SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(LeadStatus::Converted.as_str())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("Lead {id} converted to client {}", client.id);
    Ok((
        StatusCode::CREATED,
        Json(ConversionResponse {
            message: format!("Lead converted to client {}", client.name),
            client,
            lead_id: id,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::test_support::{seed_client, seed_user, test_state};

    #[test]
    fn test_employee_allowed_fields() {
        let req = UpdateLeadRequest {
            status: Some(LeadStatus::Qualified),
            notes: Some("Called back".to_string()),
            next_follow_up_date: Some(Utc::now()),
            ..UpdateLeadRequest::default()
        };
        assert!(!req.touches_admin_fields());

        let req = UpdateLeadRequest {
            estimated_value: Some(5000.0),
            ..UpdateLeadRequest::default()
        };
        assert!(req.touches_admin_fields());
    }

    #[test]
    fn test_create_request_defaults_priority() {
        let req: CreateLeadRequest = serde_json::from_str(r#"{"name": "Jordan"}"#).unwrap();
        assert_eq!(req.priority, Priority::Medium);
    }

    async fn seed_lead(
        pool: &PgPool,
        creator: Uuid,
        assignee: Option<Uuid>,
        status: LeadStatus,
        email: Option<&str>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO leads (id, name, email, company, status, assigned_to_id, created_by_id)
            VALUES ($1, 'Jordan Lee', $2, 'Lee & Co', $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(status.as_str())
        .bind(assignee)
        .bind(creator)
        .execute(pool)
        .await
        .unwrap();
        id
    }

    async fn lead_status(pool: &PgPool, id: Uuid) -> String {
        sqlx::query_scalar("SELECT status FROM leads WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn convert(
        state: &AppState,
        admin: &CurrentUser,
        id: Uuid,
    ) -> Result<ConversionResponse, AppError> {
        let (status, Json(body)) =
            handle_convert_lead(State(state.clone()), admin.clone(), Path(id)).await?;
        assert_eq!(status, StatusCode::CREATED);
        Ok(body)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_only_closed_won_leads_convert(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        let lead = seed_lead(
            &pool,
            admin.id,
            None,
            LeadStatus::Qualified,
            Some("jordan@lee.test"),
        )
        .await;

        let err = convert(&state, &admin, lead).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(lead_status(&pool, lead).await, "qualified");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_conversion_creates_client_and_marks_lead(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        let lead = seed_lead(
            &pool,
            admin.id,
            None,
            LeadStatus::ClosedWon,
            Some("Jordan@Lee.test"),
        )
        .await;

        let body = convert(&state, &admin, lead).await.unwrap();
        assert_eq!(body.lead_id, lead);
        assert_eq!(body.client.email, "jordan@lee.test");
        assert_eq!(body.client.owner_id, admin.id);
        assert_eq!(lead_status(&pool, lead).await, "converted");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_client_email_rolls_back(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        seed_client(&pool, admin.id, "jordan@lee.test").await;
        let lead = seed_lead(
            &pool,
            admin.id,
            None,
            LeadStatus::ClosedWon,
            Some("jordan@lee.test"),
        )
        .await;

        let err = convert(&state, &admin, lead).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(lead_status(&pool, lead).await, "closed_won");
        let clients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(clients, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_employee_assignee_filter_is_ignored(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        let ravi = seed_user(&pool, Role::Employee, "Ravi").await;
        let mia = seed_user(&pool, Role::Employee, "Mia").await;
        let own = seed_lead(&pool, admin.id, Some(ravi.id), LeadStatus::New, None).await;
        seed_lead(&pool, admin.id, Some(mia.id), LeadStatus::New, None).await;

        let query = |assignee| LeadListQuery {
            page: None,
            per_page: None,
            status: None,
            priority: None,
            assigned_to_id: Some(assignee),
        };

        let Json(page) =
            handle_list_leads(State(state.clone()), ravi.clone(), Query(query(mia.id)))
                .await
                .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, own);

        let Json(page) =
            handle_list_leads(State(state.clone()), admin.clone(), Query(query(mia.id)))
                .await
                .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].assigned_to_id, Some(mia.id));
    }
}
