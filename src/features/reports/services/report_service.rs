use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    CreateReportDto, DuplicateCheckDto, DuplicateReportDto, FeatureCollection, ReportStatsDto,
    UpdateReportStatusDto,
};
use crate::features::reports::models::{
    CreateReport, HazardType, Report, ReportSource, ReportVerification, StatusChange,
};
use crate::features::reports::services::{
    compute_stats, map_features, query_reports, ProximityMatcher, RadiusFilter, ReportFilter,
    ReportPage,
};
use crate::features::reports::stores::ReportStore;
use crate::shared::constants::MAX_DUPLICATE_SUGGESTIONS;
use crate::shared::geo::GeoPoint;
use crate::shared::types::PaginationQuery;

/// Name recorded for authenticated submitters whose token carries no name
const ANONYMOUS_REPORTER: &str = "Anonymous";

/// Service for hazard report operations
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    matcher: ProximityMatcher,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>, matcher: ProximityMatcher) -> Self {
        Self { store, matcher }
    }

    /// Snapshot narrowed to what could possibly be a duplicate of the candidate
    async fn duplicate_candidates(
        &self,
        hazard_type: HazardType,
        location: GeoPoint,
        now: DateTime<Utc>,
    ) -> Result<Vec<Report>> {
        let config = self.matcher.config();
        let prefilter = ReportFilter {
            hazard_type: Some(hazard_type),
            created_after: Some(now - config.window),
            near: Some(RadiusFilter {
                center: location,
                radius_km: config.radius_km,
            }),
            ..Default::default()
        };
        self.store.snapshot(&prefilter).await
    }

    fn to_suggestions(
        &self,
        hazard_type: HazardType,
        location: &GeoPoint,
        now: DateTime<Utc>,
        snapshot: &[Report],
    ) -> Vec<DuplicateReportDto> {
        self.matcher
            .find_duplicates(hazard_type, location, now, snapshot)
            .into_iter()
            .take(MAX_DUPLICATE_SUGGESTIONS)
            .map(DuplicateReportDto::from)
            .collect()
    }

    /// Advisory duplicate check for a not-yet-submitted report.
    /// Incomplete candidates yield no suggestions.
    pub async fn check_duplicates(
        &self,
        dto: &DuplicateCheckDto,
        now: DateTime<Utc>,
    ) -> Result<Vec<DuplicateReportDto>> {
        let (Some(hazard_type), Some(lat), Some(lng)) = (dto.hazard_type, dto.lat, dto.lng) else {
            return Ok(Vec::new());
        };
        let location = GeoPoint::new(lat, lng)?;

        let snapshot = self.duplicate_candidates(hazard_type, location, now).await?;
        Ok(self.to_suggestions(hazard_type, &location, now, &snapshot))
    }

    /// Persist a new report. Near-duplicates are returned alongside as
    /// advisory information; they never block the submission.
    pub async fn submit(
        &self,
        dto: CreateReportDto,
        user: Option<&AuthenticatedUser>,
        now: DateTime<Utc>,
    ) -> Result<(Report, Vec<DuplicateReportDto>)> {
        let location = GeoPoint::new(dto.location.lat, dto.location.lng)?;

        let (user_id, reporter_name, source) = match user {
            Some(user) => (
                Some(user.sub.clone()),
                user.name
                    .clone()
                    .or(dto.reporter_name)
                    .unwrap_or_else(|| ANONYMOUS_REPORTER.to_string()),
                if user.is_official() {
                    ReportSource::Official
                } else {
                    ReportSource::Citizen
                },
            ),
            None => {
                let name = dto.reporter_name.ok_or_else(|| {
                    AppError::Validation(
                        "reporter_name is required when submitting without signing in"
                            .to_string(),
                    )
                })?;
                if dto.reporter_contact.is_none() {
                    return Err(AppError::Validation(
                        "reporter_contact is required when submitting without signing in"
                            .to_string(),
                    ));
                }
                (None, name, ReportSource::Citizen)
            }
        };

        let snapshot = self
            .duplicate_candidates(dto.hazard_type, location, now)
            .await?;
        let duplicates = self.to_suggestions(dto.hazard_type, &location, now, &snapshot);

        let report = self
            .store
            .insert(&CreateReport {
                user_id,
                reporter_name,
                reporter_contact: dto.reporter_contact,
                hazard_type: dto.hazard_type,
                title: dto.title,
                description: dto.description,
                location,
                location_address: dto.location.address,
                severity: dto.severity,
                source,
            })
            .await?;

        tracing::info!(
            report_id = %report.id,
            hazard_type = %report.hazard_type,
            duplicates = duplicates.len(),
            "Created hazard report"
        );

        Ok((report, duplicates))
    }

    /// Get report by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    /// Filtered, recency-sorted, paginated listing
    pub async fn list(
        &self,
        filter: &ReportFilter,
        pagination: &PaginationQuery,
    ) -> Result<ReportPage> {
        let snapshot = self.store.snapshot(filter).await?;
        Ok(query_reports(&snapshot, filter, pagination))
    }

    /// Map overlay for the filtered set
    pub async fn map_data(&self, filter: &ReportFilter) -> Result<FeatureCollection> {
        let snapshot = self.store.snapshot(filter).await?;
        Ok(map_features(&snapshot, filter))
    }

    /// Aggregate counts over all reports
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<ReportStatsDto> {
        let snapshot = self.store.snapshot(&ReportFilter::default()).await?;
        Ok(compute_stats(&snapshot, now))
    }

    /// Change report status (officials only; enforced by the handler guard)
    pub async fn update_status(
        &self,
        id: Uuid,
        dto: UpdateReportStatusDto,
        user: &AuthenticatedUser,
    ) -> Result<Report> {
        let change = StatusChange {
            status: dto.status,
            changed_by: user.sub.clone(),
            notes: dto.verification_notes,
        };

        let report = self
            .store
            .update_status(id, &change)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        tracing::info!(
            report_id = %id,
            status = %report.status,
            changed_by = %user.sub,
            "Report status updated"
        );

        Ok(report)
    }

    /// Verification audit trail for a report
    pub async fn list_verifications(&self, id: Uuid) -> Result<Vec<ReportVerification>> {
        self.get_by_id(id).await?;
        self.store.list_verifications(id).await
    }
}
