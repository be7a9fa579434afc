use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::leads::ensure_user_exists;
use super::tasks::ensure_client_exists;
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::meeting::{overlaps, Meeting, MeetingStatus, MeetingType, MEETING_SELECT};
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;

const DEFAULT_CALENDAR_DAYS: i64 = 7;
const MAX_CALENDAR_DAYS: i64 = 30;

#[derive(Debug, Serialize, FromRow)]
pub struct MeetingStats {
    pub total: i64,
    pub scheduled: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub today: i64,
    pub upcoming: i64,
}

#[derive(Debug, Deserialize)]
pub struct MeetingListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<MeetingStatus>,
    pub meeting_type: Option<MeetingType>,
    pub assigned_to_id: Option<Uuid>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub meeting_type: MeetingType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    pub assigned_to_id: Uuid,
    pub client_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeetingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub meeting_type: Option<MeetingType>,
    pub status: Option<MeetingStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub assigned_to_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub attendees: Option<Vec<String>>,
    pub meeting_notes: Option<String>,
    pub follow_up_required: Option<bool>,
}

impl UpdateMeetingRequest {
    /// Employees may only record the outcome of their meetings.
    fn touches_admin_fields(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.meeting_type.is_some()
            || self.start_time.is_some()
            || self.end_time.is_some()
            || self.location.is_some()
            || self.assigned_to_id.is_some()
            || self.client_id.is_some()
            || self.lead_id.is_some()
            || self.attendees.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub meeting_type: String,
    pub status: String,
    pub location: Option<String>,
    pub assigned_to_name: Option<String>,
    pub client_name: Option<String>,
    pub lead_name: Option<String>,
    pub attendees: Vec<String>,
}

impl From<Meeting> for CalendarEvent {
    fn from(m: Meeting) -> Self {
        Self {
            id: m.id,
            title: m.title,
            start: m.start_time,
            end: m.end_time,
            meeting_type: m.meeting_type,
            status: m.status,
            location: m.location,
            assigned_to_name: m.assigned_to_name,
            client_name: m.client_name,
            lead_name: m.lead_name,
            attendees: m.attendees,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub events: Vec<CalendarEvent>,
    pub days: i64,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Meeting {id} not found"))
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::Validation(
            "Meeting end time must be after its start time".to_string(),
        ));
    }
    Ok(())
}

fn calendar_days(days: Option<i64>) -> Result<i64, AppError> {
    let days = days.unwrap_or(DEFAULT_CALENDAR_DAYS);
    if !(1..=MAX_CALENDAR_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "days must be between 1 and {MAX_CALENDAR_DAYS}"
        )));
    }
    Ok(days)
}

async fn fetch_meeting(pool: &PgPool, id: Uuid) -> Result<Meeting, AppError> {
    sqlx::query_as::<_, Meeting>(&format!("{MEETING_SELECT} WHERE m.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn ensure_lead_exists(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM leads WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Lead {id} not found")))
    }
}

/// Rejects `[start, end)` when the assignee already has a scheduled meeting in it.
async fn ensure_no_conflict(
    pool: &PgPool,
    assignee: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let booked: Vec<(Uuid, String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
        r#"
        SELECT id, title, start_time, end_time FROM meetings
        WHERE assigned_to_id = $1 AND status = $2 AND start_time < $3 AND end_time > $4
        "#,
    )
    .bind(assignee)
    .bind(MeetingStatus::Scheduled.as_str())
    .bind(end)
    .bind(start)
    .fetch_all(pool)
    .await?;

    let clash = booked
        .into_iter()
        .filter(|(id, ..)| Some(*id) != except)
        .find(|(_, _, s, e)| overlaps(start, end, *s, *e));
    match clash {
        Some((_, title, s, e)) => Err(AppError::Conflict(format!(
            "Assignee already has '{title}' scheduled from {} to {}",
            s.to_rfc3339(),
            e.to_rfc3339()
        ))),
        None => Ok(()),
    }
}

/// True when the update leaves the meeting `scheduled` in a slot it did not
/// hold as a scheduled meeting before: moved, reassigned or revived.
fn needs_conflict_check(current_status: &str, req: &UpdateMeetingRequest) -> bool {
    let was_scheduled = current_status == MeetingStatus::Scheduled.as_str();
    let ends_scheduled = req
        .status
        .map_or(was_scheduled, |s| s == MeetingStatus::Scheduled);
    let rebooked =
        req.start_time.is_some() || req.end_time.is_some() || req.assigned_to_id.is_some();
    ends_scheduled && (rebooked || !was_scheduled)
}

/// GET /api/v1/meetings/stats
pub async fn handle_meeting_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MeetingStats>, AppError> {
    let stats = sqlx::query_as::<_, MeetingStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE status = 'scheduled') AS scheduled,
            COUNT(*) FILTER (WHERE status = 'completed') AS completed,
            COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled,
            COUNT(*) FILTER (WHERE start_time::date = CURRENT_DATE) AS today,
            COUNT(*) FILTER (
                WHERE status = 'scheduled'
                  AND start_time >= NOW()
                  AND start_time < NOW() + INTERVAL '7 days'
            ) AS upcoming
        FROM meetings
        WHERE ($1::uuid IS NULL OR assigned_to_id = $1)
        "#,
    )
    .bind(user.scope())
    .fetch_one(&state.db)
    .await?;
    Ok(Json(stats))
}

/// GET /api/v1/meetings
pub async fn handle_list_meetings(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<MeetingListQuery>,
) -> Result<Json<Page<Meeting>>, AppError> {
    let page = PageRequest::new(q.page, q.per_page)?;
    let assignee = user.scope().or(q.assigned_to_id);
    let status = q.status.map(|s| s.as_str());
    let meeting_type = q.meeting_type.map(|t| t.as_str());

    const FILTER: &str = "($1::uuid IS NULL OR m.assigned_to_id = $1) \
        AND ($2::text IS NULL OR m.status = $2) \
        AND ($3::text IS NULL OR m.meeting_type = $3) \
        AND ($4::timestamptz IS NULL OR m.start_time >= $4) \
        AND ($5::timestamptz IS NULL OR m.start_time <= $5)";

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM meetings m WHERE {FILTER}"))
            .bind(assignee)
            .bind(status)
            .bind(meeting_type)
            .bind(q.date_from)
            .bind(q.date_to)
            .fetch_one(&state.db)
            .await?;
    let items = sqlx::query_as::<_, Meeting>(&format!(
        "{MEETING_SELECT} WHERE {FILTER} ORDER BY m.start_time LIMIT $6 OFFSET $7"
    ))
    .bind(assignee)
    .bind(status)
    .bind(meeting_type)
    .bind(q.date_from)
    .bind(q.date_to)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(Page::new(items, total, page)))
}

/// POST /api/v1/meetings
pub async fn handle_create_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<Meeting>), AppError> {
    user.require_admin()?;
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Meeting title must not be empty".to_string()));
    }
    validate_window(req.start_time, req.end_time)?;
    ensure_user_exists(&state.db, req.assigned_to_id).await?;
    if let Some(client_id) = req.client_id {
        ensure_client_exists(&state.db, client_id).await?;
    }
    if let Some(lead_id) = req.lead_id {
        ensure_lead_exists(&state.db, lead_id).await?;
    }
    ensure_no_conflict(&state.db, req.assigned_to_id, req.start_time, req.end_time, None).await?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO meetings
            (id, title, description, meeting_type, status, start_time, end_time, location,
             assigned_to_id, created_by_id, client_id, lead_id, attendees)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(req.meeting_type.as_str())
    .bind(MeetingStatus::Scheduled.as_str())
    .bind(req.start_time)
    .bind(req.end_time)
    .bind(&req.location)
    .bind(req.assigned_to_id)
    .bind(user.id)
    .bind(req.client_id)
    .bind(req.lead_id)
    .bind(&req.attendees)
    .execute(&state.db)
    .await?;

    info!("Meeting {id} scheduled for {}", req.assigned_to_id);
    Ok((StatusCode::CREATED, Json(fetch_meeting(&state.db, id).await?)))
}

/// GET /api/v1/meetings/:id
pub async fn handle_get_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Meeting>, AppError> {
    let meeting = fetch_meeting(&state.db, id).await?;
    user.require_admin_or(Some(meeting.assigned_to_id))?;
    Ok(Json(meeting))
}

/// PUT /api/v1/meetings/:id
pub async fn handle_update_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMeetingRequest>,
) -> Result<Json<Meeting>, AppError> {
    let meeting = fetch_meeting(&state.db, id).await?;
    user.require_admin_or(Some(meeting.assigned_to_id))?;
    if !user.is_admin() && req.touches_admin_fields() {
        return Err(AppError::Forbidden(
            "Employees may only update status, notes and follow-up".to_string(),
        ));
    }

    let start = req.start_time.unwrap_or(meeting.start_time);
    let end = req.end_time.unwrap_or(meeting.end_time);
    let assignee = req.assigned_to_id.unwrap_or(meeting.assigned_to_id);
    validate_window(start, end)?;
    if let Some(assignee) = req.assigned_to_id {
        ensure_user_exists(&state.db, assignee).await?;
    }
    if let Some(client_id) = req.client_id {
        ensure_client_exists(&state.db, client_id).await?;
    }
    if let Some(lead_id) = req.lead_id {
        ensure_lead_exists(&state.db, lead_id).await?;
    }
    if needs_conflict_check(&meeting.status, &req) {
        ensure_no_conflict(&state.db, assignee, start, end, Some(id)).await?;
    }

    sqlx::query(
        r#"
        UPDATE meetings SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            meeting_type = COALESCE($4, meeting_type),
            status = COALESCE($5, status),
            start_time = $6,
            end_time = $7,
            location = COALESCE($8, location),
            assigned_to_id = $9,
            client_id = COALESCE($10, client_id),
            lead_id = COALESCE($11, lead_id),
            attendees = COALESCE($12, attendees),
            meeting_notes = COALESCE($13, meeting_notes),
            follow_up_required = COALESCE($14, follow_up_required),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(req.title.as_deref().map(str::trim))
    .bind(&req.description)
    .bind(req.meeting_type.map(|t| t.as_str()))
    .bind(req.status.map(|s| s.as_str()))
    .bind(start)
    .bind(end)
    .bind(&req.location)
    .bind(assignee)
    .bind(req.client_id)
    .bind(req.lead_id)
    .bind(&req.attendees)
    .bind(&req.meeting_notes)
    .bind(req.follow_up_required)
    .execute(&state.db)
    .await?;

    Ok(Json(fetch_meeting(&state.db, id).await?))
}

/// DELETE /api/v1/meetings/:id
pub async fn handle_delete_meeting(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require_admin()?;
    let deleted = sqlx::query("DELETE FROM meetings WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/meetings/calendar/upcoming
pub async fn handle_upcoming_calendar(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let days = calendar_days(q.days)?;
    let from = Utc::now();
    let to = from + Duration::days(days);

    let meetings = sqlx::query_as::<_, Meeting>(&format!(
        "{MEETING_SELECT} \
         WHERE ($1::uuid IS NULL OR m.assigned_to_id = $1) \
           AND m.status IN ($2, $3) \
           AND m.start_time >= $4 AND m.start_time < $5 \
         ORDER BY m.start_time"
    ))
    .bind(user.scope())
    .bind(MeetingStatus::Scheduled.as_str())
    .bind(MeetingStatus::Rescheduled.as_str())
    .bind(from)
    .bind(to)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(CalendarResponse {
        events: meetings.into_iter().map(CalendarEvent::from).collect(),
        days,
        from,
        to,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::models::user::Role;
    use crate::test_support::{seed_user, test_state};

    #[test]
    fn test_window_must_be_positive() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        assert!(validate_window(start, start + Duration::minutes(30)).is_ok());
        assert!(validate_window(start, start).is_err());
        assert!(validate_window(start, start - Duration::minutes(1)).is_err());
    }

    #[test]
    fn test_calendar_days_bounds() {
        assert_eq!(calendar_days(None).unwrap(), 7);
        assert_eq!(calendar_days(Some(30)).unwrap(), 30);
        assert!(calendar_days(Some(0)).is_err());
        assert!(calendar_days(Some(31)).is_err());
    }

    #[test]
    fn test_employee_allowed_fields() {
        let req = UpdateMeetingRequest {
            status: Some(MeetingStatus::Completed),
            meeting_notes: Some("Signed off on scope".to_string()),
            follow_up_required: Some(true),
            ..UpdateMeetingRequest::default()
        };
        assert!(!req.touches_admin_fields());
        let req = UpdateMeetingRequest {
            start_time: Some(Utc::now()),
            ..UpdateMeetingRequest::default()
        };
        assert!(req.touches_admin_fields());
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateMeetingRequest = serde_json::from_str(
            r#"{
                "title": "Kickoff",
                "start_time": "2025-06-02T09:00:00Z",
                "end_time": "2025-06-02T10:00:00Z",
                "assigned_to_id": "00000000-0000-0000-0000-000000000000"
            }"#,
        )
        .unwrap();
        assert_eq!(req.meeting_type, MeetingType::General);
        assert!(req.attendees.is_empty());
    }

    #[test]
    fn test_conflict_check_triggers() {
        let scheduled = MeetingStatus::Scheduled.as_str();
        let cancelled = MeetingStatus::Cancelled.as_str();

        let notes_only = UpdateMeetingRequest {
            meeting_notes: Some("Went well".to_string()),
            ..UpdateMeetingRequest::default()
        };
        assert!(!needs_conflict_check(scheduled, &notes_only));

        let moved = UpdateMeetingRequest {
            start_time: Some(Utc::now()),
            ..UpdateMeetingRequest::default()
        };
        assert!(needs_conflict_check(scheduled, &moved));
        assert!(!needs_conflict_check(cancelled, &moved));

        let revived = UpdateMeetingRequest {
            status: Some(MeetingStatus::Scheduled),
            ..UpdateMeetingRequest::default()
        };
        assert!(needs_conflict_check(cancelled, &revived));
        assert!(needs_conflict_check(MeetingStatus::Rescheduled.as_str(), &revived));
        assert!(!needs_conflict_check(scheduled, &revived));

        let cancelling = UpdateMeetingRequest {
            status: Some(MeetingStatus::Cancelled),
            start_time: Some(Utc::now()),
            ..UpdateMeetingRequest::default()
        };
        assert!(!needs_conflict_check(scheduled, &cancelling));
    }

    /// Tomorrow at `hour`:`minute` UTC.
    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        let day = (Utc::now() + Duration::days(1)).date_naive();
        day.and_hms_opt(hour, minute, 0).unwrap().and_utc()
    }

    async fn book(
        state: &AppState,
        admin: &CurrentUser,
        assignee: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Meeting, AppError> {
        let req = CreateMeetingRequest {
            title: "Client sync".to_string(),
            description: None,
            meeting_type: MeetingType::ClientCall,
            start_time: start,
            end_time: end,
            location: None,
            assigned_to_id: assignee,
            client_id: None,
            lead_id: None,
            attendees: Vec::new(),
        };
        let (_, Json(meeting)) =
            handle_create_meeting(State(state.clone()), admin.clone(), Json(req)).await?;
        Ok(meeting)
    }

    async fn update(
        state: &AppState,
        user: &CurrentUser,
        id: Uuid,
        req: UpdateMeetingRequest,
    ) -> Result<Meeting, AppError> {
        let Json(meeting) =
            handle_update_meeting(State(state.clone()), user.clone(), Path(id), Json(req)).await?;
        Ok(meeting)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_overlapping_booking_is_rejected(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        let rep = seed_user(&pool, Role::Employee, "Ravi").await;

        book(&state, &admin, rep.id, at(10, 0), at(11, 0)).await.unwrap();
        let err = book(&state, &admin, rep.id, at(10, 30), at(11, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Back-to-back slots do not overlap.
        book(&state, &admin, rep.id, at(11, 0), at(12, 0)).await.unwrap();
        // Another assignee is free in the same slot.
        let other = seed_user(&pool, Role::Employee, "Mia").await;
        book(&state, &admin, other.id, at(10, 0), at(11, 0)).await.unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_reschedule_ignores_the_meeting_itself(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        let rep = seed_user(&pool, Role::Employee, "Ravi").await;

        let meeting = book(&state, &admin, rep.id, at(10, 0), at(11, 0)).await.unwrap();
        let moved = update(
            &state,
            &admin,
            meeting.id,
            UpdateMeetingRequest {
                start_time: Some(at(10, 15)),
                end_time: Some(at(11, 15)),
                ..UpdateMeetingRequest::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.start_time, at(10, 15));

        book(&state, &admin, rep.id, at(13, 0), at(14, 0)).await.unwrap();
        let err = update(
            &state,
            &admin,
            meeting.id,
            UpdateMeetingRequest {
                start_time: Some(at(13, 30)),
                end_time: Some(at(14, 30)),
                ..UpdateMeetingRequest::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_reviving_cancelled_meeting_checks_overlap(pool: PgPool) {
        let state = test_state(pool.clone());
        let admin = seed_user(&pool, Role::Admin, "Ada").await;
        let rep = seed_user(&pool, Role::Employee, "Ravi").await;

        let first = book(&state, &admin, rep.id, at(10, 0), at(11, 0)).await.unwrap();
        update(
            &state,
            &rep,
            first.id,
            UpdateMeetingRequest {
                status: Some(MeetingStatus::Cancelled),
                ..UpdateMeetingRequest::default()
            },
        )
        .await
        .unwrap();
        book(&state, &admin, rep.id, at(10, 0), at(11, 0)).await.unwrap();

        let err = update(
            &state,
            &rep,
            first.id,
            UpdateMeetingRequest {
                status: Some(MeetingStatus::Scheduled),
                ..UpdateMeetingRequest::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let scheduled: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM meetings WHERE assigned_to_id = $1 AND status = 'scheduled'",
        )
        .bind(rep.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(scheduled, 1);
    }
}
