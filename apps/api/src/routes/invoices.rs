use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::jobs::sweeps::flag_overdue_invoices;
use crate::jobs::Job;
use crate::models::invoice::{format_invoice_number, round_amount, Invoice, InvoiceStatus, INVOICE_SELECT};
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct InvoiceStats {
    pub total: i64,
    pub paid: i64,
    pub overdue: i64,
    pub pending: i64,
    pub total_revenue: f64,
    pub overdue_amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_id: Uuid,
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub amount: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Serialize)]
pub struct SendInvoiceResponse {
    pub message: String,
    pub invoice: Invoice,
    pub email_queued: bool,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub message: String,
    pub count: usize,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Invoice {id} not found"))
}

fn validate_amount(amount: f64) -> Result<f64, AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation("Amount must be positive".to_string()));
    }
    Ok(round_amount(amount))
}

async fn fetch_invoice(pool: &PgPool, id: Uuid) -> Result<Invoice, AppError> {
    sqlx::query_as::<_, Invoice>(&format!("{INVOICE_SELECT} WHERE i.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Next `INV-<year>-<NNNN>` for invoices issued in `now`'s year.
///
/// Draws from the per-year counter row, so numbers freed by deletes are never
/// handed out again. The row lock serialises concurrent creates until commit.
async fn next_invoice_number(
    conn: &mut PgConnection,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let sequence: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO invoice_counters (year, last_value)
        VALUES ($1, 1)
        ON CONFLICT (year) DO UPDATE SET last_value = invoice_counters.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(now.year())
    .fetch_one(&mut *conn)
    .await?;
    Ok(format_invoice_number(now, sequence))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// GET /api/v1/invoices/stats
pub async fn handle_invoice_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<InvoiceStats>, AppError> {
    let stats = sqlx::query_as::<_, InvoiceStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = 'paid') AS paid,
            COUNT(*) FILTER (WHERE status = 'overdue') AS overdue,
            COUNT(*) FILTER (WHERE status IN ('draft', 'sent')) AS pending,
            COALESCE(SUM(amount) FILTER (WHERE status = 'paid'), 0)::float8 AS total_revenue,
            COALESCE(SUM(amount) FILTER (WHERE status = 'overdue'), 0)::float8 AS overdue_amount
        FROM invoices
        WHERE ($1::uuid IS NULL OR user_id = $1)
        "#,
    )
    .bind(user.scope())
    .fetch_one(&state.db)
    .await?;
    Ok(Json(stats))
}

/// GET /api/v1/invoices
pub async fn handle_list_invoices(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<InvoiceListQuery>,
) -> Result<Json<Page<Invoice>>, AppError> {
    let page = PageRequest::new(q.page, q.per_page)?;
    let status = q.status.map(|s| s.as_str());

    const FILTER: &str = "($1::uuid IS NULL OR i.user_id = $1) \
        AND ($2::text IS NULL OR i.status = $2) \
        AND ($3::uuid IS NULL OR i.client_id = $3)";

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM invoices i WHERE {FILTER}"))
            .bind(user.scope())
            .bind(status)
            .bind(q.client_id)
            .fetch_one(&state.db)
            .await?;
    let items = sqlx::query_as::<_, Invoice>(&format!(
        "{INVOICE_SELECT} WHERE {FILTER} ORDER BY i.created_at DESC LIMIT $4 OFFSET $5"
    ))
    .bind(user.scope())
    .bind(status)
    .bind(q.client_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(Page::new(items, total, page)))
}

/// POST /api/v1/invoices
pub async fn handle_create_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    user.require_admin()?;
    let amount = validate_amount(req.amount)?;

    let client_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
            .bind(req.client_id)
            .fetch_one(&state.db)
            .await?;
    if !client_exists {
        return Err(AppError::NotFound(format!("Client {} not found", req.client_id)));
    }

    let now = Utc::now();
    let mut tx = state.db.begin().await?;
    let number = next_invoice_number(&mut *tx, now).await?;
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO invoices (id, invoice_number, client_id, user_id, amount, status, due_date, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(&number)
    .bind(req.client_id)
    .bind(user.id)
    .bind(amount)
    .bind(InvoiceStatus::Draft.as_str())
    .bind(req.due_date)
    .bind(&req.description)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Invoice number {number} is already taken"))
        } else {
            AppError::Database(e)
        }
    })?;
    tx.commit().await?;

    info!("Invoice {number} created for client {}", req.client_id);
    Ok((StatusCode::CREATED, Json(fetch_invoice(&state.db, id).await?)))
}

/// GET /api/v1/invoices/:id
pub async fn handle_get_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = fetch_invoice(&state.db, id).await?;
    user.require_admin_or(Some(invoice.user_id))?;
    Ok(Json(invoice))
}

/// PUT /api/v1/invoices/:id
pub async fn handle_update_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateInvoiceRequest>,
) -> Result<Json<Invoice>, AppError> {
    user.require_admin()?;
    let amount = req.amount.map(validate_amount).transpose()?;

    let updated = sqlx::query(
        r#"
        UPDATE invoices SET
            amount = COALESCE($2, amount),
            due_date = COALESCE($3, due_date),
            description = COALESCE($4, description),
            status = COALESCE($5, status),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(amount)
    .bind(req.due_date)
    .bind(&req.description)
    .bind(req.status.map(|s| s.as_str()))
    .execute(&state.db)
    .await?
    .rows_affected();
    if updated == 0 {
        return Err(not_found(id));
    }
    Ok(Json(fetch_invoice(&state.db, id).await?))
}

/// DELETE /api/v1/invoices/:id
pub async fn handle_delete_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require_admin()?;
    let deleted = sqlx::query("DELETE FROM invoices WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn set_status(pool: &PgPool, id: Uuid, status: InvoiceStatus) -> Result<(), AppError> {
    let paid_date = (status == InvoiceStatus::Paid).then(Utc::now);
    let updated = sqlx::query(
        "UPDATE invoices SET status = $2, paid_date = COALESCE($3, paid_date), updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(status.as_str())
    .bind(paid_date)
    .execute(pool)
    .await?
    .rows_affected();
    if updated == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// POST /api/v1/invoices/:id/send
/// A queue outage does not undo the status change; the caller sees `email_queued: false`.
pub async fn handle_send_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SendInvoiceResponse>, AppError> {
    user.require_admin()?;
    set_status(&state.db, id, InvoiceStatus::Sent).await?;

    let email_queued = match state.jobs.enqueue(&Job::InvoiceEmail { invoice_id: id }).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to queue invoice email for {id}: {e}");
            false
        }
    };
    let invoice = fetch_invoice(&state.db, id).await?;
    Ok(Json(SendInvoiceResponse {
        message: format!("Invoice {} sent", invoice.invoice_number),
        invoice,
        email_queued,
    }))
}

/// POST /api/v1/invoices/:id/mark-paid
pub async fn handle_mark_paid(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    user.require_admin()?;
    set_status(&state.db, id, InvoiceStatus::Paid).await?;
    Ok(Json(fetch_invoice(&state.db, id).await?))
}

/// POST /api/v1/invoices/overdue/send-reminders
pub async fn handle_send_reminders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ReminderResponse>, AppError> {
    user.require_admin()?;
    let flagged = flag_overdue_invoices(&state.db, &state.jobs).await?;
    Ok(Json(ReminderResponse {
        message: format!("Payment reminders queued for {} overdue invoices", flagged.len()),
        count: flagged.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::models::user::Role;
    use crate::test_support::{seed_client, seed_user, test_state};

    #[test]
    fn test_validate_amount() {
        assert!((validate_amount(10.006).unwrap() - 10.01).abs() < 1e-9);
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-5.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_create_request_parses_rfc3339_due_date() {
        let req: CreateInvoiceRequest = serde_json::from_str(
            r#"{"client_id": "00000000-0000-0000-0000-000000000000", "amount": 250.0, "due_date": "2025-07-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.due_date, Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
        assert!(req.description.is_none());
    }

    fn invoice_request(client_id: Uuid) -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            client_id,
            amount: 480.0,
            due_date: Utc::now() + chrono::Duration::days(30),
            description: Some("Retainer".to_string()),
        }
    }

    async fn create(
        state: &AppState,
        admin: &CurrentUser,
        client_id: Uuid,
    ) -> Result<Invoice, AppError> {
        let (status, Json(invoice)) = handle_create_invoice(
            State(state.clone()),
            admin.clone(),
            Json(invoice_request(client_id)),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        Ok(invoice)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_numbers_are_not_reused_after_delete(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        let client = seed_client(&pool, admin.id, "billing@northwind.test").await;
        let year = Utc::now().year();

        let first = create(&state, &admin, client).await.unwrap();
        let second = create(&state, &admin, client).await.unwrap();
        assert_eq!(first.invoice_number, format!("INV-{year}-0001"));
        assert_eq!(second.invoice_number, format!("INV-{year}-0002"));

        handle_delete_invoice(State(state.clone()), admin.clone(), Path(first.id))
            .await
            .unwrap();
        let third = create(&state, &admin, client).await.unwrap();
        let fourth = create(&state, &admin, client).await.unwrap();
        assert_eq!(third.invoice_number, format!("INV-{year}-0003"));
        assert_eq!(fourth.invoice_number, format!("INV-{year}-0004"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_creates_get_distinct_numbers(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        let client = seed_client(&pool, admin.id, "billing@northwind.test").await;

        let mut set = tokio::task::JoinSet::new();
        for _ in 0..5 {
            let (state, admin) = (state.clone(), admin.clone());
            set.spawn(async move { create(&state, &admin, client).await });
        }
        let mut numbers = Vec::new();
        while let Some(joined) = set.join_next().await {
            numbers.push(joined.unwrap().unwrap().invoice_number);
        }
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 5);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_for_unknown_client_is_404(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        let err = create(&state, &admin, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let issued: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoice_counters")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(issued, 0);
    }
}
