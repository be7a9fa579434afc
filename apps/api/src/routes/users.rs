use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::handlers::{insert_user, NewUser};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::user::{EmployeeSummary, Role, User};
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// GET /api/v1/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<UserListQuery>,
) -> Result<Json<Page<User>>, AppError> {
    user.require_admin()?;
    let page = PageRequest::new(q.page, q.per_page)?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;
    let items = sqlx::query_as::<_, User>(
        "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(Page::new(items, total, page)))
}

/// GET /api/v1/users/employees
pub async fn handle_list_employees(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<EmployeeSummary>>, AppError> {
    user.require_admin()?;
    let employees = sqlx::query_as::<_, EmployeeSummary>(
        "SELECT id, full_name, email FROM users WHERE role = $1 AND is_active ORDER BY full_name, email",
    )
    .bind(Role::Employee.as_str())
    .fetch_all(&state.db)
    .await?;
    Ok(Json(employees))
}

/// POST /api/v1/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    user.require_admin()?;
    let created = insert_user(
        &state.db,
        NewUser {
            email: &req.email,
            password: &req.password,
            full_name: req.full_name.as_deref(),
            role: req.role,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    user.require_admin_or(Some(id))?;
    let found = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    Ok(Json(found))
}

/// PUT /api/v1/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    user.require_admin()?;
    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            full_name = COALESCE($2, full_name),
            role = COALESCE($3, role),
            is_active = COALESCE($4, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.full_name.as_deref().map(str::trim))
    .bind(req.role.map(|r| r.as_str()))
    .bind(req.is_active)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    Ok(Json(updated))
}
