pub mod clients;
pub mod dashboard;
pub mod health;
pub mod invoices;
pub mod leads;
pub mod meetings;
pub mod posts;
pub mod tasks;
pub mod users;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::ai::handlers as ai;
use crate::analytics::handlers as analytics;
use crate::auth::handlers as auth;
use crate::performance::handlers as performance;
use crate::reports::handlers as reports;
use crate::state::AppState;
use crate::trending::handlers as trending;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/register", post(auth::handle_register))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/me", get(auth::handle_me))
        // Users
        .route(
            "/users",
            get(users::handle_list_users).post(users::handle_create_user),
        )
        .route("/users/employees", get(users::handle_list_employees))
        .route(
            "/users/:id",
            get(users::handle_get_user).put(users::handle_update_user),
        )
        // Clients and the public portal
        .route("/clients/stats", get(clients::handle_client_stats))
        .route(
            "/clients",
            get(clients::handle_list_clients).post(clients::handle_create_client),
        )
        .route(
            "/clients/:id",
            get(clients::handle_get_client)
                .put(clients::handle_update_client)
                .delete(clients::handle_delete_client),
        )
        .route("/clients/portal/:id/info", get(clients::handle_portal_info))
        .route("/clients/portal/:id/submit", post(clients::handle_portal_submit))
        .route(
            "/clients/:id/portal-submissions",
            get(clients::handle_list_submissions),
        )
        .route(
            "/clients/portal-submissions/:id/status",
            patch(clients::handle_update_submission_status),
        )
        // Invoices
        .route("/invoices/stats", get(invoices::handle_invoice_stats))
        .route(
            "/invoices",
            get(invoices::handle_list_invoices).post(invoices::handle_create_invoice),
        )
        .route(
            "/invoices/:id",
            get(invoices::handle_get_invoice)
                .put(invoices::handle_update_invoice)
                .delete(invoices::handle_delete_invoice),
        )
        .route("/invoices/:id/send", post(invoices::handle_send_invoice))
        .route("/invoices/:id/mark-paid", post(invoices::handle_mark_paid))
        .route(
            "/invoices/overdue/send-reminders",
            post(invoices::handle_send_reminders),
        )
        // Leads
        .route("/leads/stats", get(leads::handle_lead_stats))
        .route(
            "/leads",
            get(leads::handle_list_leads).post(leads::handle_create_lead),
        )
        .route(
            "/leads/:id",
            get(leads::handle_get_lead)
                .put(leads::handle_update_lead)
                .delete(leads::handle_delete_lead),
        )
        .route(
            "/leads/:id/convert-to-client",
            post(leads::handle_convert_lead),
        )
        // Tasks
        .route("/tasks/stats", get(tasks::handle_task_stats))
        .route(
            "/tasks",
            get(tasks::handle_list_tasks).post(tasks::handle_create_task),
        )
        .route(
            "/tasks/:id",
            get(tasks::handle_get_task)
                .put(tasks::handle_update_task)
                .delete(tasks::handle_delete_task),
        )
        // Meetings
        .route("/meetings/stats", get(meetings::handle_meeting_stats))
        .route(
            "/meetings/calendar/upcoming",
            get(meetings::handle_upcoming_calendar),
        )
        .route(
            "/meetings",
            get(meetings::handle_list_meetings).post(meetings::handle_create_meeting),
        )
        .route(
            "/meetings/:id",
            get(meetings::handle_get_meeting)
                .put(meetings::handle_update_meeting)
                .delete(meetings::handle_delete_meeting),
        )
        .route("/dashboard/stats", get(dashboard::handle_dashboard_stats))
        // Performance (admin)
        .route(
            "/performance/team-overview",
            get(performance::handle_team_overview),
        )
        .route(
            "/performance/employees",
            get(performance::handle_employee_summaries),
        )
        .route(
            "/performance/employee/:id",
            get(performance::handle_employee_performance),
        )
        .route(
            "/performance/calculate-monthly",
            post(performance::handle_calculate_monthly),
        )
        // Per-employee analytics (admin or self; finance admin only)
        .route(
            "/analytics/employee/:id/tasks",
            get(analytics::handle_task_analytics),
        )
        .route(
            "/analytics/employee/:id/finance",
            get(analytics::handle_finance_analytics),
        )
        .route(
            "/analytics/employee/:id/projects",
            get(analytics::handle_project_analytics),
        )
        .route(
            "/analytics/employee/:id/leads",
            get(analytics::handle_lead_analytics),
        )
        // AI video scripts
        .route("/ai/generate-script", post(ai::handle_generate_script))
        .route("/ai/scripts", get(ai::handle_list_scripts))
        .route(
            "/ai/scripts/:id",
            get(ai::handle_get_script).delete(ai::handle_delete_script),
        )
        // Content: trends, ideas, reports and posts
        .route(
            "/content/discover-topics",
            post(trending::handle_discover_topics),
        )
        .route(
            "/content/analyze-custom-topic",
            post(trending::handle_analyze_custom_topic),
        )
        .route(
            "/content/trending-keywords/:field",
            get(trending::handle_trending_keywords),
        )
        .route(
            "/content/generate-content-calendar",
            post(trending::handle_content_calendar),
        )
        .route(
            "/content/generate-pdf-report",
            post(reports::handle_generate_report),
        )
        .route(
            "/content/download-pdf-report/:filename",
            get(reports::handle_download_report),
        )
        .route(
            "/content/generate-script/:topic_id",
            post(trending::handle_generate_content_script),
        )
        .route(
            "/content/posts",
            get(posts::handle_list_posts).post(posts::handle_create_post),
        )
        .route(
            "/content/content-performance/:post_id",
            get(posts::handle_post_performance),
        );

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api)
        .with_state(state)
}
