use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ReportStore;
use crate::core::error::Result;
use crate::features::reports::models::{
    CreateReport, Report, ReportStatus, ReportVerification, StatusChange,
};
use crate::features::reports::services::ReportFilter;

/// Report store kept in process memory. Used when no database is configured.
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<Vec<Report>>,
    verifications: RwLock<Vec<ReportVerification>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing reports
    #[cfg(test)]
    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self {
            reports: RwLock::new(reports),
            verifications: RwLock::default(),
        }
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn insert(&self, data: &CreateReport) -> Result<Report> {
        let now = Utc::now();
        let report = Report {
            id: Uuid::now_v7(),
            user_id: data.user_id.clone(),
            reporter_name: data.reporter_name.clone(),
            reporter_contact: data.reporter_contact.clone(),
            hazard_type: data.hazard_type,
            title: data.title.clone(),
            description: data.description.clone(),
            location_lat: data.location.lat,
            location_lng: data.location.lng,
            location_address: data.location_address.clone(),
            severity: data.severity,
            status: ReportStatus::Received,
            source: data.source,
            verified: false,
            created_at: now,
            updated_at: now,
        };

        self.reports.write().await.push(report.clone());
        Ok(report)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Report>> {
        Ok(self
            .reports
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Option<Report>> {
        let now = Utc::now();
        let updated = {
            let mut reports = self.reports.write().await;
            let Some(report) = reports.iter_mut().find(|r| r.id == id) else {
                return Ok(None);
            };
            report.status = change.status;
            report.verified = change.status.is_verified();
            report.updated_at = now;
            report.clone()
        };

        if change.notes.is_some() {
            self.verifications.write().await.push(ReportVerification {
                id: Uuid::now_v7(),
                report_id: id,
                verified_by: change.changed_by.clone(),
                verification_status: change.status,
                verification_notes: change.notes.clone(),
                created_at: now,
            });
        }

        Ok(Some(updated))
    }

    async fn list_verifications(&self, report_id: Uuid) -> Result<Vec<ReportVerification>> {
        Ok(self
            .verifications
            .read()
            .await
            .iter()
            .filter(|v| v.report_id == report_id)
            .cloned()
            .collect())
    }

    async fn snapshot(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        let mut reports: Vec<Report> = self
            .reports
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(reports)
    }
}
