mod memory_store;
mod pg_store;

pub use memory_store::InMemoryReportStore;
pub use pg_store::PgReportStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::reports::models::{CreateReport, Report, ReportVerification, StatusChange};
use crate::features::reports::services::ReportFilter;

/// Persistence for hazard reports.
///
/// Reports are never deleted; only status, the `verified` flag and
/// verification records change after creation.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, data: &CreateReport) -> Result<Report>;

    async fn get(&self, id: Uuid) -> Result<Option<Report>>;

    /// Apply a status change, keeping `verified` in lockstep with the status.
    /// Records a verification entry when notes are given.
    async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Option<Report>>;

    async fn list_verifications(&self, report_id: Uuid) -> Result<Vec<ReportVerification>>;

    /// Reports that may satisfy `filter`, newest first.
    ///
    /// Implementations may return a superset (e.g. a bounding box instead of
    /// an exact radius); callers re-apply the filter in memory.
    ///
    /// The whole matching set is loaded: listing and stats paginate and count
    /// in memory, so this suits collections of up to tens of thousands of
    /// reports. Larger deployments need LIMIT/OFFSET and COUNT pushed into SQL
    /// for requests without a radius.
    async fn snapshot(&self, filter: &ReportFilter) -> Result<Vec<Report>>;
}
