use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ScriptRequest;
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::script::{AiScript, ScriptStatus};
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScriptListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Script {id} not found"))
}

async fn fetch_script(pool: &PgPool, id: Uuid) -> Result<AiScript, AppError> {
    sqlx::query_as::<_, AiScript>("SELECT * FROM ai_scripts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
}

/// POST /api/v1/ai/generate-script
pub async fn handle_generate_script(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ScriptRequest>,
) -> Result<(StatusCode, Json<AiScript>), AppError> {
    req.validate()?;
    let script = state.scripts.write(&req).await;
    let stored = sqlx::query_as::<_, AiScript>(
        r#"
        INSERT INTO ai_scripts (
            id, topic, script_content, video_style, target_duration, tone, include_hook,
            status, generated_by, user_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.topic.trim())
    .bind(&script.content)
    .bind(req.video_style.trim())
    .bind(req.target_duration)
    .bind(req.tone.trim())
    .bind(req.include_hook)
    .bind(ScriptStatus::Generated.as_str())
    .bind(script.author.as_str())
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    info!("Generated {} script {} for {}", script.author, stored.id, user.email);
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/v1/ai/scripts
pub async fn handle_list_scripts(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<ScriptListQuery>,
) -> Result<Json<Page<AiScript>>, AppError> {
    let page = PageRequest::new(q.page, q.per_page)?;

    const FILTER: &str = "($1::uuid IS NULL OR user_id = $1)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM ai_scripts WHERE {FILTER}"))
        .bind(user.scope())
        .fetch_one(&state.db)
        .await?;
    let items = sqlx::query_as::<_, AiScript>(&format!(
        "SELECT * FROM ai_scripts WHERE {FILTER} ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"
    ))
    .bind(user.scope())
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(Page::new(items, total, page)))
}

/// GET /api/v1/ai/scripts/:id
pub async fn handle_get_script(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AiScript>, AppError> {
    let script = fetch_script(&state.db, id).await?;
    user.require_admin_or(Some(script.user_id))?;
    Ok(Json(script))
}

/// DELETE /api/v1/ai/scripts/:id
pub async fn handle_delete_script(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let script = fetch_script(&state.db, id).await?;
    user.require_admin_or(Some(script.user_id))?;
    sqlx::query("DELETE FROM ai_scripts WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::models::script::ScriptAuthor;
    use crate::models::user::Role;
    use crate::test_support::{seed_user, test_state};

    fn request(topic: &str) -> ScriptRequest {
        serde_json::from_value(json!({ "topic": topic, "target_duration": 90 })).unwrap()
    }

    async fn generate(state: &AppState, user: &CurrentUser, topic: &str) -> AiScript {
        let (status, Json(script)) =
            handle_generate_script(State(state.clone()), user.clone(), Json(request(topic)))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        script
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_generated_script_is_stored(pool: PgPool) {
        let state = test_state(pool);
        let ana = seed_user(&state.db, Role::Employee, "Ana").await;

        let script = generate(&state, &ana, "  Quarterly planning ").await;
        assert_eq!(script.topic, "Quarterly planning");
        assert_eq!(script.target_duration, 90);
        assert_eq!(script.status, ScriptStatus::Generated.as_str());
        assert_eq!(script.generated_by, ScriptAuthor::Template.as_str());
        assert!(script.script_content.contains("[MAIN CONTENT]"));

        let Json(fetched) = handle_get_script(State(state.clone()), ana.clone(), Path(script.id))
            .await
            .unwrap();
        assert_eq!(fetched.script_content, script.script_content);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_invalid_request_stores_nothing(pool: PgPool) {
        let state = test_state(pool);
        let ana = seed_user(&state.db, Role::Employee, "Ana").await;
        let mut req = request("Payroll");
        req.target_duration = 0;

        let err = handle_generate_script(State(state.clone()), ana, Json(req))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ai_scripts")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_listing_is_newest_first_and_scoped(pool: PgPool) {
        let state = test_state(pool);
        let admin = seed_user(&state.db, Role::Admin, "Root").await;
        let ana = seed_user(&state.db, Role::Employee, "Ana").await;
        let ben = seed_user(&state.db, Role::Employee, "Ben").await;

        let older = generate(&state, &ana, "Older").await;
        sqlx::query("UPDATE ai_scripts SET created_at = now() - interval '1 day' WHERE id = $1")
            .bind(older.id)
            .execute(&state.db)
            .await
            .unwrap();
        let newer = generate(&state, &ana, "Newer").await;
        generate(&state, &ben, "Ben's").await;

        let query = || Query(ScriptListQuery { page: None, per_page: None });
        let Json(mine) = handle_list_scripts(State(state.clone()), ana.clone(), query())
            .await
            .unwrap();
        let ids: Vec<Uuid> = mine.items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        let Json(all) = handle_list_scripts(State(state.clone()), admin, query())
            .await
            .unwrap();
        assert_eq!(all.total, 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_only_owner_or_admin_can_read_or_delete(pool: PgPool) {
        let state = test_state(pool);
        let admin = seed_user(&state.db, Role::Admin, "Root").await;
        let ana = seed_user(&state.db, Role::Employee, "Ana").await;
        let ben = seed_user(&state.db, Role::Employee, "Ben").await;
        let script = generate(&state, &ana, "Retention").await;

        let err = handle_get_script(State(state.clone()), ben.clone(), Path(script.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = handle_delete_script(State(state.clone()), ben, Path(script.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let status = handle_delete_script(State(state.clone()), admin.clone(), Path(script.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let err = handle_delete_script(State(state.clone()), admin, Path(script.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
