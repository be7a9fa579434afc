//! Background work: a Redis list used as a job queue, a worker draining it,
//! and fixed-interval sweeps that feed it.

pub mod mailer;
pub mod queue;
pub mod scheduler;
pub mod social;
pub mod sweeps;
pub mod worker;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use queue::JobQueue;

/// A unit of queued work. Serialized as tagged JSON onto the Redis list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    LeadFollowUp { lead_id: Uuid },
    InvoiceEmail { invoice_id: Uuid },
    PaymentReminder { invoice_id: Uuid },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::LeadFollowUp { .. } => "lead_follow_up",
            Job::InvoiceEmail { .. } => "invoice_email",
            Job::PaymentReminder { .. } => "payment_reminder",
        }
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Job payload error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Mail delivery failed: {0}")]
    Mail(String),
}
