use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(
    /// Funnel position. `Converted` is set once the lead became a client.
    LeadStatus {
        New => "new",
        Contacted => "contacted",
        Qualified => "qualified",
        Proposal => "proposal",
        ClosedWon => "closed_won",
        ClosedLost => "closed_lost",
        Converted => "converted",
    }
);

impl LeadStatus {
    /// Statuses that count as "reached out to" for performance purposes.
    pub const CONTACTED: &'static [LeadStatus] = &[
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Proposal,
        LeadStatus::ClosedWon,
        LeadStatus::ClosedLost,
        LeadStatus::Converted,
    ];

    pub const QUALIFIED: &'static [LeadStatus] = &[
        LeadStatus::Qualified,
        LeadStatus::Proposal,
        LeadStatus::ClosedWon,
        LeadStatus::Converted,
    ];

    /// A converted lead was won before it became a client.
    pub const WON: &'static [LeadStatus] = &[LeadStatus::ClosedWon, LeadStatus::Converted];
}

/// Lead row joined with assignee and creator names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub priority: String,
    pub assigned_to_id: Option<Uuid>,
    pub created_by_id: Uuid,
    pub estimated_value: Option<f64>,
    pub notes: Option<String>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_to_name: Option<String>,
    pub created_by_name: Option<String>,
}

impl Lead {
    /// Name for a client created from this lead.
    pub fn client_name(&self) -> &str {
        self.company
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

pub const LEAD_SELECT: &str = "SELECT l.*, a.full_name AS assigned_to_name, c.full_name AS created_by_name \
     FROM leads l \
     LEFT JOIN users a ON a.id = l.assigned_to_id \
     LEFT JOIN users c ON c.id = l.created_by_id";
