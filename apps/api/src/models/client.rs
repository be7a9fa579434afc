use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(ClientStatus {
    Pending => "pending",
    Active => "active",
    Completed => "completed",
    Inactive => "inactive",
    PortalSubmitted => "portal_submitted",
});

text_enum!(OnboardingStage {
    Initial => "initial",
    RequirementsSubmitted => "requirements_submitted",
    ProposalSent => "proposal_sent",
    ContractSigned => "contract_signed",
    ProjectStarted => "project_started",
    Completed => "completed",
});

text_enum!(SubmissionStatus {
    New => "new",
    Reviewed => "reviewed",
    InProgress => "in_progress",
    Completed => "completed",
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: String,
    pub onboarding_stage: String,
    pub notes: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PortalSubmission {
    pub id: Uuid,
    pub client_id: Uuid,
    pub project_requirements: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub additional_info: Option<String>,
    pub preferred_contact_method: String,
    pub urgency_level: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
