//! Periodic database sweeps. Each one is also callable on demand.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::social::SocialPublisher;
use super::{Job, JobError, JobQueue};
use crate::models::content::{ContentPost, PostStatus};
use crate::models::invoice::InvoiceStatus;
use crate::models::lead::LeadStatus;

const FOLLOW_UP_BATCH: i64 = 10;

/// Queues follow-ups for the oldest `new` leads and marks them contacted.
///
/// A lead only moves to `contacted` once its job is on the queue.
pub async fn follow_up_new_leads(pool: &PgPool, queue: &JobQueue) -> Result<usize, JobError> {
    let lead_ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT id FROM leads
        WHERE status = $1 AND email IS NOT NULL AND email <> ''
        ORDER BY created_at
        LIMIT $2
        "#,
    )
    .bind(LeadStatus::New.as_str())
    .bind(FOLLOW_UP_BATCH)
    .fetch_all(pool)
    .await?;

    let mut queued = 0;
    for lead_id in lead_ids {
        queue.enqueue(&Job::LeadFollowUp { lead_id }).await?;
        sqlx::query(
            "UPDATE leads SET status = $2, last_contact_date = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(lead_id)
        .bind(LeadStatus::Contacted.as_str())
        .execute(pool)
        .await?;
        queued += 1;
    }

    if queued > 0 {
        info!("Queued follow-ups for {queued} new leads");
    }
    Ok(queued)
}

/// Flags sent invoices past their due date as overdue and queues a reminder for each.
/// Returns the ids that were flagged.
pub async fn flag_overdue_invoices(pool: &PgPool, queue: &JobQueue) -> Result<Vec<Uuid>, JobError> {
    let flagged: Vec<Uuid> = sqlx::query_scalar(
        r#"
        UPDATE invoices SET status = $2, updated_at = NOW()
        WHERE status = $1 AND due_date < NOW()
        RETURNING id
        "#,
    )
    .bind(InvoiceStatus::Sent.as_str())
    .bind(InvoiceStatus::Overdue.as_str())
    .fetch_all(pool)
    .await?;

    for invoice_id in &flagged {
        if let Err(e) = queue
            .enqueue(&Job::PaymentReminder {
                invoice_id: *invoice_id,
            })
            .await
        {
            warn!("Failed to queue payment reminder for invoice {invoice_id}: {e}");
        }
    }

    if !flagged.is_empty() {
        info!("Flagged {} invoices as overdue", flagged.len());
    }
    Ok(flagged)
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct PublishSummary {
    pub published: usize,
    pub failed: usize,
}

/// Publishes every scheduled post that is due.
pub async fn publish_due_posts(
    pool: &PgPool,
    publisher: &dyn SocialPublisher,
) -> Result<PublishSummary, JobError> {
    let due = sqlx::query_as::<_, ContentPost>(
        "SELECT * FROM content_posts WHERE status = $1 AND scheduled_for <= NOW() ORDER BY scheduled_for",
    )
    .bind(PostStatus::Scheduled.as_str())
    .fetch_all(pool)
    .await?;

    let mut summary = PublishSummary::default();
    for post in due {
        match publisher.publish(&post).await {
            Ok(external_id) => {
                sqlx::query(
                    r#"
                    UPDATE content_posts
                    SET status = $2, published_at = NOW(), external_post_id = $3, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(post.id)
                .bind(PostStatus::Published.as_str())
                .bind(&external_id)
                .execute(pool)
                .await?;
                summary.published += 1;
            }
            Err(e) => {
                warn!("Post {} could not be published: {e}", post.id);
                sqlx::query("UPDATE content_posts SET status = $2, updated_at = NOW() WHERE id = $1")
                    .bind(post.id)
                    .bind(PostStatus::Failed.as_str())
                    .execute(pool)
                    .await?;
                summary.failed += 1;
            }
        }
    }

    if summary.published + summary.failed > 0 {
        info!(
            "Scheduled posting: {} published, {} failed",
            summary.published, summary.failed
        );
    }
    Ok(summary)
}
