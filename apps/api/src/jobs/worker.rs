use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::mailer::{
    invoice_email, lead_follow_up_email, payment_reminder_email, EmailMessage, Mailer,
};
use super::{Job, JobError, JobQueue};
use crate::models::client::Client;
use crate::models::invoice::{Invoice, INVOICE_SELECT};
use crate::models::lead::{Lead, LEAD_SELECT};

const POP_TIMEOUT_SECS: u64 = 5;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Drains the job queue forever. Connection failures back off and reconnect.
pub async fn run_worker(pool: PgPool, queue: JobQueue, mailer: Arc<dyn Mailer>) {
    info!("Job worker started");
    loop {
        let mut conn = match queue.consumer_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Job worker cannot reach Redis: {e}");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        loop {
            let payload = match queue.pop_raw(&mut conn, POP_TIMEOUT_SECS).await {
                Ok(Some(payload)) => payload,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Job queue read failed, reconnecting: {e}");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    break;
                }
            };

            let job = match serde_json::from_str::<Job>(&payload) {
                Ok(job) => job,
                Err(e) => {
                    warn!("Dropping undecodable job payload {payload:?}: {e}");
                    continue;
                }
            };

            match process_job(&pool, mailer.as_ref(), &job).await {
                Ok(()) => info!("Processed {} job", job.kind()),
                Err(e) => error!("Job {} failed: {e}", job.kind()),
            }
        }
    }
}

/// Resolves the job's records and hands the composed email to the mailer.
pub async fn process_job(pool: &PgPool, mailer: &dyn Mailer, job: &Job) -> Result<(), JobError> {
    let Some(message) = compose(pool, job).await? else {
        return Ok(());
    };
    mailer
        .send(&message)
        .await
        .map_err(|e| JobError::Mail(e.to_string()))
}

async fn compose(pool: &PgPool, job: &Job) -> Result<Option<EmailMessage>, JobError> {
    match job {
        Job::LeadFollowUp { lead_id } => {
            let lead = sqlx::query_as::<_, Lead>(&format!("{LEAD_SELECT} WHERE l.id = $1"))
                .bind(lead_id)
                .fetch_optional(pool)
                .await?;
            let Some(lead) = lead else {
                warn!("Lead {lead_id} vanished before follow-up");
                return Ok(None);
            };
            let message = lead_follow_up_email(&lead);
            if message.is_none() {
                warn!("Lead {lead_id} has no email address; skipping follow-up");
            }
            Ok(message)
        }
        Job::InvoiceEmail { invoice_id } => Ok(load_invoice(pool, *invoice_id)
            .await?
            .map(|(invoice, client)| invoice_email(&invoice, &client))),
        Job::PaymentReminder { invoice_id } => Ok(load_invoice(pool, *invoice_id)
            .await?
            .map(|(invoice, client)| payment_reminder_email(&invoice, &client, Utc::now()))),
    }
}

async fn load_invoice(pool: &PgPool, invoice_id: Uuid) -> Result<Option<(Invoice, Client)>, JobError> {
    let invoice = sqlx::query_as::<_, Invoice>(&format!("{INVOICE_SELECT} WHERE i.id = $1"))
        .bind(invoice_id)
        .fetch_optional(pool)
        .await?;
    let Some(invoice) = invoice else {
        warn!("Invoice {invoice_id} vanished before its email was sent");
        return Ok(None);
    };
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(invoice.client_id)
        .fetch_one(pool)
        .await?;
    Ok(Some((invoice, client)))
}
