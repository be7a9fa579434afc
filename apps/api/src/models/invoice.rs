use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(InvoiceStatus {
    Draft => "draft",
    Sent => "sent",
    Paid => "paid",
    Overdue => "overdue",
});

/// Invoice row joined with its client's name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub status: String,
    pub due_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub client_name: Option<String>,
}

/// Column list shared by every invoice read.
pub const INVOICE_SELECT: &str = "SELECT i.*, c.name AS client_name \
     FROM invoices i LEFT JOIN clients c ON c.id = i.client_id";

/// `INV-<year>-<sequence>` where sequence is zero-padded to four digits.
pub fn format_invoice_number(issued_at: DateTime<Utc>, sequence: i64) -> String {
    format!("INV-{}-{:04}", issued_at.year(), sequence)
}

/// Rounds a currency amount to cents.
pub fn round_amount(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
