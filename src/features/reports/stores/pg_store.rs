use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::ReportStore;
use crate::core::error::{AppError, Result};
use crate::features::reports::models::{CreateReport, Report, ReportVerification, StatusChange};
use crate::features::reports::services::ReportFilter;
use crate::shared::geo::bounding_box;

const REPORT_COLUMNS: &str = r#"
    id, user_id, reporter_name, reporter_contact, hazard_type, title, description,
    location_lat, location_lng, location_address, severity, status, source, verified,
    created_at, updated_at
"#;

/// Postgres-backed report store
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Push the exact-match predicates and a bounding box for the radius.
    /// The exact haversine check happens in memory afterwards.
    fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
        if let Some(hazard_type) = filter.hazard_type {
            qb.push(" AND hazard_type = ").push_bind(hazard_type);
        }
        if let Some(severity) = filter.severity {
            qb.push(" AND severity = ").push_bind(severity);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(source) = filter.source {
            qb.push(" AND source = ").push_bind(source);
        }
        if let Some(verified) = filter.verified {
            qb.push(" AND verified = ").push_bind(verified);
        }
        if let Some(after) = filter.created_after {
            qb.push(" AND created_at >= ").push_bind(after);
        }
        if let Some(before) = filter.created_before {
            qb.push(" AND created_at <= ").push_bind(before);
        }
        if let Some(near) = &filter.near {
            let bbox = bounding_box(&near.center, near.radius_km);
            qb.push(" AND location_lat BETWEEN ")
                .push_bind(bbox.min_lat)
                .push(" AND ")
                .push_bind(bbox.max_lat);

            // No longitude bound when the circle reaches a pole or the antimeridian
            if let Some((min_lng, max_lng)) = bbox.lng_range {
                qb.push(" AND location_lng BETWEEN ")
                    .push_bind(min_lng)
                    .push(" AND ")
                    .push_bind(max_lng);
            }
        }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, data: &CreateReport) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO hazard_reports (
                user_id, reporter_name, reporter_contact, hazard_type, title, description,
                location_lat, location_lng, location_address, severity, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(&data.user_id)
        .bind(&data.reporter_name)
        .bind(&data.reporter_contact)
        .bind(data.hazard_type)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.location.lat)
        .bind(data.location.lng)
        .bind(&data.location_address)
        .bind(data.severity)
        .bind(data.source)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create report: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(report)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM hazard_reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get report: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update_status(&self, id: Uuid, change: &StatusChange) -> Result<Option<Report>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE hazard_reports
            SET status = $2, verified = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(change.status)
        .bind(change.status.is_verified())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::Database(e)
        })?;

        let Some(report) = report else {
            return Ok(None);
        };

        if let Some(notes) = &change.notes {
            sqlx::query(
                r#"
                INSERT INTO report_verifications (report_id, verified_by, verification_status, verification_notes)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(&change.changed_by)
            .bind(change.status)
            .bind(notes)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record verification: {:?}", e);
                AppError::Database(e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit status update: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(Some(report))
    }

    async fn list_verifications(&self, report_id: Uuid) -> Result<Vec<ReportVerification>> {
        sqlx::query_as::<_, ReportVerification>(
            r#"
            SELECT id, report_id, verified_by, verification_status, verification_notes, created_at
            FROM report_verifications
            WHERE report_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list report verifications: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn snapshot(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM hazard_reports WHERE 1=1",
            REPORT_COLUMNS
        ));
        Self::push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC");

        let reports = qb
            .build_query_as::<Report>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query reports: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::debug!("Report snapshot fetched {} candidate rows", reports.len());
        Ok(reports)
    }
}
