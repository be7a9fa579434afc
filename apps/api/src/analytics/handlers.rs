use axum::extract::State;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{FinanceAnalytics, LeadAnalytics, ProjectAnalytics, TaskAnalytics};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path};
use crate::models::lead::{Lead, LEAD_SELECT};
use crate::models::task::{Task, TASK_SELECT};
use crate::state::AppState;

async fn ensure_employee(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(AppError::NotFound(format!("Employee {id} not found")));
    }
    Ok(())
}

async fn employee_tasks(pool: &PgPool, id: Uuid) -> Result<Vec<Task>, AppError> {
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "{TASK_SELECT} WHERE t.assigned_to_id = $1 ORDER BY t.created_at DESC"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(tasks)
}

/// GET /api/v1/analytics/employee/:id/tasks
pub async fn handle_task_analytics(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskAnalytics>, AppError> {
    user.require_admin_or(Some(id))?;
    ensure_employee(&state.db, id).await?;
    let tasks = employee_tasks(&state.db, id).await?;
    Ok(Json(TaskAnalytics::from_tasks(id, &tasks, Utc::now())))
}

/// GET /api/v1/analytics/employee/:id/finance
pub async fn handle_finance_analytics(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FinanceAnalytics>, AppError> {
    user.require_admin()?;
    ensure_employee(&state.db, id).await?;
    let tasks = employee_tasks(&state.db, id).await?;
    Ok(Json(FinanceAnalytics::from_tasks(id, &tasks, Utc::now())))
}

/// GET /api/v1/analytics/employee/:id/projects
pub async fn handle_project_analytics(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectAnalytics>, AppError> {
    user.require_admin_or(Some(id))?;
    ensure_employee(&state.db, id).await?;
    let tasks = employee_tasks(&state.db, id).await?;
    Ok(Json(ProjectAnalytics::from_tasks(id, &tasks)))
}

/// GET /api/v1/analytics/employee/:id/leads
pub async fn handle_lead_analytics(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadAnalytics>, AppError> {
    user.require_admin_or(Some(id))?;
    ensure_employee(&state.db, id).await?;
    let leads = sqlx::query_as::<_, Lead>(&format!(
        "{LEAD_SELECT} WHERE l.assigned_to_id = $1 ORDER BY l.created_at DESC"
    ))
    .bind(id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(LeadAnalytics::from_leads(id, &leads, Utc::now())))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::user::Role;
    use crate::test_support::{seed_client, seed_user, test_state};

    async fn seed_task(
        pool: &PgPool,
        assignee: Uuid,
        creator: Uuid,
        client: Option<Uuid>,
        status: &str,
    ) {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, title, status, assigned_to_id, created_by_id, client_id,
                               estimated_hours, actual_hours, completed_at)
            VALUES ($1, 'Audit', $2, $3, $4, $5, 4, 3,
                    CASE WHEN $2 = 'completed' THEN now() END)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(status)
        .bind(assignee)
        .bind(creator)
        .bind(client)
        .execute(pool)
        .await
        .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_employee_sees_own_analytics_only(pool: PgPool) {
        let state = test_state(pool);
        let admin = seed_user(&state.db, Role::Admin, "Root").await;
        let ana = seed_user(&state.db, Role::Employee, "Ana").await;
        let ben = seed_user(&state.db, Role::Employee, "Ben").await;
        seed_task(&state.db, ana.id, admin.id, None, "completed").await;
        seed_task(&state.db, ana.id, admin.id, None, "todo").await;
        seed_task(&state.db, ben.id, admin.id, None, "todo").await;

        let Json(own) = handle_task_analytics(State(state.clone()), ana.clone(), Path(ana.id))
            .await
            .unwrap();
        assert_eq!(own.total_tasks, 2);
        assert_eq!(own.completed_tasks, 1);
        assert_eq!(own.productivity_score, 50.0);

        let err = handle_task_analytics(State(state.clone()), ana.clone(), Path(ben.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = handle_lead_analytics(State(state.clone()), ana.clone(), Path(ben.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let Json(by_admin) = handle_task_analytics(State(state.clone()), admin, Path(ben.id))
            .await
            .unwrap();
        assert_eq!(by_admin.total_tasks, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_finance_is_admin_only(pool: PgPool) {
        let state = test_state(pool);
        let admin = seed_user(&state.db, Role::Admin, "Root").await;
        let ana = seed_user(&state.db, Role::Employee, "Ana").await;
        let client = seed_client(&state.db, admin.id, "books@northwind.test").await;
        seed_task(&state.db, ana.id, admin.id, Some(client), "completed").await;

        let err = handle_finance_analytics(State(state.clone()), ana.clone(), Path(ana.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let Json(finance) = handle_finance_analytics(State(state.clone()), admin, Path(ana.id))
            .await
            .unwrap();
        assert_eq!(finance.billable_hours, 3.0);
        assert_eq!(finance.total_revenue_generated, 225.0);
        assert_eq!(finance.project_earnings[0].client, "Northwind");
        assert_eq!(finance.efficiency_rating, 5.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_projects_and_leads_use_employee_rows(pool: PgPool) {
        let state = test_state(pool);
        let admin = seed_user(&state.db, Role::Admin, "Root").await;
        let ana = seed_user(&state.db, Role::Employee, "Ana").await;
        let client = seed_client(&state.db, admin.id, "ops@northwind.test").await;
        seed_task(&state.db, ana.id, admin.id, Some(client), "completed").await;
        seed_task(&state.db, ana.id, admin.id, Some(client), "in_progress").await;
        for status in ["closed_won", "new"] {
            sqlx::query(
                "INSERT INTO leads (id, name, source, status, assigned_to_id, created_by_id, estimated_value) \
                 VALUES ($1, 'Prospect', 'Referral', $2, $3, $4, 1200)",
            )
            .bind(Uuid::new_v4())
            .bind(status)
            .bind(ana.id)
            .bind(admin.id)
            .execute(&state.db)
            .await
            .unwrap();
        }

        let Json(projects) =
            handle_project_analytics(State(state.clone()), ana.clone(), Path(ana.id))
                .await
                .unwrap();
        assert_eq!(projects.total_projects, 1);
        assert_eq!(projects.active_projects, 1);
        assert_eq!(projects.projects[0].name, "Northwind Project");
        assert_eq!(projects.projects[0].budget, 600.0);

        let Json(leads) = handle_lead_analytics(State(state.clone()), ana.clone(), Path(ana.id))
            .await
            .unwrap();
        assert_eq!(leads.leads_generated, 2);
        assert_eq!(leads.leads_converted, 1);
        assert_eq!(leads.avg_lead_value, Some(1200.0));
        assert_eq!(leads.lead_sources[0].source, "referral");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unknown_employee_is_404_for_admin(pool: PgPool) {
        let state = test_state(pool);
        let admin = seed_user(&state.db, Role::Admin, "Root").await;
        let err = handle_project_analytics(State(state), admin, Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
