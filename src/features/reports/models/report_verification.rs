use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::ReportStatus;

/// Audit record written when an official reviews a report
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ReportVerification {
    pub id: Uuid,
    pub report_id: Uuid,
    pub verified_by: String,
    pub verification_status: ReportStatus,
    pub verification_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
