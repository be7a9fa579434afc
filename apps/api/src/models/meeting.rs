use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(MeetingType {
    General => "general",
    ClientCall => "client_call",
    TeamMeeting => "team_meeting",
    FollowUp => "follow_up",
});

impl Default for MeetingType {
    fn default() -> Self {
        MeetingType::General
    }
}

text_enum!(MeetingStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
    Rescheduled => "rescheduled",
});

/// Meeting row joined with assignee, client and lead names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub meeting_type: String,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    pub assigned_to_id: Uuid,
    pub created_by_id: Uuid,
    pub client_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub attendees: Vec<String>,
    pub meeting_notes: Option<String>,
    pub follow_up_required: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_to_name: Option<String>,
    pub client_name: Option<String>,
    pub lead_name: Option<String>,
}

pub const MEETING_SELECT: &str = "SELECT m.*, u.full_name AS assigned_to_name, \
     c.name AS client_name, l.name AS lead_name \
     FROM meetings m \
     LEFT JOIN users u ON u.id = m.assigned_to_id \
     LEFT JOIN clients c ON c.id = m.client_id \
     LEFT JOIN leads l ON l.id = m.lead_id";

/// True when `[a_start, a_end)` and `[b_start, b_end)` share any instant.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_overlap_detected() {
        assert!(overlaps(at(9), at(11), at(10), at(12)));
        assert!(overlaps(at(9), at(12), at(10), at(11)));
    }

    #[test]
    fn test_back_to_back_meetings_do_not_overlap() {
        assert!(!overlaps(at(9), at(10), at(10), at(11)));
        assert!(!overlaps(at(10), at(11), at(9), at(10)));
    }

    #[test]
    fn test_disjoint_meetings_do_not_overlap() {
        let start = at(14);
        assert!(!overlaps(at(9), at(10), start, start + Duration::minutes(30)));
    }
}
