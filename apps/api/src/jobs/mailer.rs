use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::client::Client;
use crate::models::invoice::Invoice;
use crate::models::lead::Lead;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Writes messages to the log instead of delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "Email composed ({} bytes body)",
            message.body.len()
        );
        Ok(())
    }
}

/// `None` when the lead has no email address.
pub fn lead_follow_up_email(lead: &Lead) -> Option<EmailMessage> {
    let to = lead.email.as_deref().filter(|e| !e.trim().is_empty())?;
    let company_line = lead
        .company
        .as_deref()
        .map(|c| format!(" and how we can help {c}"))
        .unwrap_or_default();
    Some(EmailMessage {
        to: to.to_string(),
        subject: format!("Follow-up: Let's discuss your needs, {}", lead.name),
        body: format!(
            "Hi {},\n\nThanks for your interest. We'd love to learn more about your goals{company_line}.\n\
             Reply to this email to set up a short call.\n\nBest regards",
            lead.name
        ),
    })
}

pub fn invoice_email(invoice: &Invoice, client: &Client) -> EmailMessage {
    EmailMessage {
        to: client.email.clone(),
        subject: format!("Invoice {} from our team", invoice.invoice_number),
        body: format!(
            "Hello {},\n\nPlease find invoice {} for {:.2}, due {}.\n{}\n\nThank you for your business.",
            client.name,
            invoice.invoice_number,
            invoice.amount,
            format_date(invoice.due_date),
            invoice.description.as_deref().unwrap_or_default(),
        ),
    }
}

pub fn payment_reminder_email(invoice: &Invoice, client: &Client, now: DateTime<Utc>) -> EmailMessage {
    let days_late = (now - invoice.due_date).num_days().max(0);
    EmailMessage {
        to: client.email.clone(),
        subject: format!("Payment reminder: invoice {} is overdue", invoice.invoice_number),
        body: format!(
            "Hello {},\n\nInvoice {} for {:.2} was due on {} ({days_late} days ago).\n\
             Please arrange payment at your earliest convenience.",
            client.name,
            invoice.invoice_number,
            invoice.amount,
            format_date(invoice.due_date),
        ),
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
