//! PDF reports built from trending-topic discovery.
//!
//! A report is composed into layout blocks, rendered with the Helvetica
//! base fonts and stored in the object store under the requesting user's
//! prefix. Downloads only ever read from that prefix.

pub mod compose;
pub mod font_metrics;
pub mod handlers;
pub mod render;
pub mod storage;

use chrono::{DateTime, Utc};

use crate::errors::AppError;

fn safe_component(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "report".to_string()
    } else {
        cleaned
    }
}

/// `opsdesk_report_<field>_<user>_<YYYYmmdd_HHMMSS>.pdf`.
pub fn report_filename(field: &str, user: &str, now: DateTime<Utc>) -> String {
    format!(
        "opsdesk_report_{}_{}_{}.pdf",
        safe_component(field),
        safe_component(user),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Rejects anything that could escape the user's report prefix.
pub fn validate_filename(filename: &str) -> Result<(), AppError> {
    let traversal = filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0');
    let allowed = filename
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if filename.is_empty() || traversal || !allowed {
        return Err(AppError::Validation("Invalid report filename".to_string()));
    }
    Ok(())
}
