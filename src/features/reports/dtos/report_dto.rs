use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::reports::models::{
    HazardType, Report, ReportSeverity, ReportSource, ReportStatus, ReportVerification,
};
use crate::features::reports::services::{DuplicateMatch, RadiusFilter, ReportFilter};
use crate::shared::geo::GeoPoint;
use crate::shared::types::{PaginationMeta, PaginationQuery};

/// Radius applied when a center is given without `radius_km`
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 50.0;

// ============================================================================
// Requests
// ============================================================================

/// Location of a submitted report
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LocationDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lng: f64,
    #[validate(length(min = 5, max = 500))]
    pub address: String,
}

/// Request DTO for submitting a hazard report
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[serde(rename = "type")]
    pub hazard_type: HazardType,
    #[validate(length(min = 5, max = 500))]
    pub title: String,
    #[validate(length(min = 10, max = 2000))]
    pub description: String,
    #[validate(nested)]
    pub location: LocationDto,
    pub severity: ReportSeverity,
    /// Required when submitting without authentication
    #[validate(length(min = 2, max = 255))]
    pub reporter_name: Option<String>,
    /// Required when submitting without authentication
    #[validate(length(min = 1, max = 255))]
    pub reporter_contact: Option<String>,
}

/// Request DTO for an advisory duplicate check before submission.
/// Missing type or coordinates yields an empty result.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DuplicateCheckDto {
    #[serde(rename = "type")]
    pub hazard_type: Option<HazardType>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lng: Option<f64>,
}

/// Request DTO for updating report status
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
    #[validate(length(max = 1000))]
    pub verification_notes: Option<String>,
}

/// Query parameters for the report listing.
///
/// Enum filters arrive as raw strings so an unknown value can be rejected
/// with the offending field named.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ReportQueryParams {
    /// Hazard type (tsunami, high-waves, storm-surge, coastal-damage, unusual-tides, swell-surge)
    #[serde(rename = "type")]
    pub hazard_type: Option<String>,
    /// Severity (low, medium, high, critical)
    pub severity: Option<String>,
    /// Status (received, under-review, verified, rejected)
    pub status: Option<String>,
    /// Source (citizen, official, social)
    pub source: Option<String>,
    pub verified: Option<bool>,
    /// Inclusive lower bound on creation time (RFC 3339)
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time (RFC 3339)
    pub end_date: Option<DateTime<Utc>>,
    /// Latitude of the search center (requires `lng`)
    pub lat: Option<f64>,
    /// Longitude of the search center (requires `lat`)
    pub lng: Option<f64>,
    /// Search radius in km around the center (default: 50)
    pub radius_km: Option<f64>,
    /// Page number (1-indexed, default: 1)
    #[param(minimum = 1)]
    pub page: Option<i64>,
    /// Number of items per page (default: 20, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

impl ReportQueryParams {
    /// Parse raw parameters into a typed filter, rejecting invalid values
    pub fn to_filter(&self) -> Result<ReportFilter, AppError> {
        let invalid = |e: crate::features::reports::models::UnknownVariant| {
            AppError::Validation(e.to_string())
        };

        let hazard_type = self
            .hazard_type
            .as_deref()
            .map(str::parse::<HazardType>)
            .transpose()
            .map_err(invalid)?;
        let severity = self
            .severity
            .as_deref()
            .map(str::parse::<ReportSeverity>)
            .transpose()
            .map_err(invalid)?;
        let status = self
            .status
            .as_deref()
            .map(str::parse::<ReportStatus>)
            .transpose()
            .map_err(invalid)?;
        let source = self
            .source
            .as_deref()
            .map(str::parse::<ReportSource>)
            .transpose()
            .map_err(invalid)?;

        if let (Some(after), Some(before)) = (self.start_date, self.end_date) {
            if after > before {
                return Err(AppError::Validation(
                    "start_date must not be after end_date".to_string(),
                ));
            }
        }

        let near = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                let center = GeoPoint::new(lat, lng)
                    .map_err(|e| AppError::Validation(format!("Invalid center: {}", e)))?;
                let radius_km = self.radius_km.unwrap_or(DEFAULT_SEARCH_RADIUS_KM);
                if !radius_km.is_finite() || radius_km < 0.0 {
                    return Err(AppError::Validation(
                        "radius_km must be a non-negative number".to_string(),
                    ));
                }
                Some(RadiusFilter { center, radius_km })
            }
            (None, None) => {
                if self.radius_km.is_some() {
                    return Err(AppError::Validation(
                        "radius_km requires both lat and lng".to_string(),
                    ));
                }
                None
            }
            _ => {
                return Err(AppError::Validation(
                    "lat and lng must be provided together".to_string(),
                ))
            }
        };

        Ok(ReportFilter {
            hazard_type,
            severity,
            status,
            source,
            verified: self.verified,
            created_after: self.start_date,
            created_before: self.end_date,
            near,
        })
    }

    pub fn pagination(&self) -> PaginationQuery {
        let default = PaginationQuery::default();
        PaginationQuery::new(
            self.page.unwrap_or(default.page),
            self.page_size.unwrap_or(default.page_size),
        )
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Location of a report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportLocationDto {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub hazard_type: HazardType,
    pub title: String,
    pub description: String,
    pub location: ReportLocationDto,
    pub severity: ReportSeverity,
    pub status: ReportStatus,
    pub source: ReportSource,
    pub verified: bool,
    pub user_id: Option<String>,
    pub reporter_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            hazard_type: r.hazard_type,
            title: r.title,
            description: r.description,
            location: ReportLocationDto {
                lat: r.location_lat,
                lng: r.location_lng,
                address: r.location_address,
            },
            severity: r.severity,
            status: r.status,
            source: r.source,
            verified: r.verified,
            user_id: r.user_id,
            reporter_name: r.reporter_name,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A nearby recent report of the same type
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DuplicateReportDto {
    #[serde(flatten)]
    pub report: ReportResponseDto,
    pub distance_km: f64,
}

impl From<DuplicateMatch<'_>> for DuplicateReportDto {
    fn from(m: DuplicateMatch<'_>) -> Self {
        Self {
            report: m.report.clone().into(),
            distance_km: m.distance_km,
        }
    }
}

/// Response DTO for a new submission, with advisory duplicates
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateReportResponseDto {
    pub report: ReportResponseDto,
    pub duplicates: Vec<DuplicateReportDto>,
}

/// Paginated report listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportListDto {
    pub items: Vec<ReportResponseDto>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
}

/// Response DTO for a verification audit record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportVerificationDto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub verified_by: String,
    pub verification_status: ReportStatus,
    pub verification_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReportVerification> for ReportVerificationDto {
    fn from(v: ReportVerification) -> Self {
        Self {
            id: v.id,
            report_id: v.report_id,
            verified_by: v.verified_by,
            verification_status: v.verification_status,
            verification_notes: v.verification_notes,
            created_at: v.created_at,
        }
    }
}

// ============================================================================
// Map View
// ============================================================================

/// Point geometry; coordinates are `[lng, lat]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: [f64; 2],
}

/// Non-geometry fields of a map feature
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MapFeatureProperties {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub hazard_type: HazardType,
    pub title: String,
    pub description: String,
    pub severity: ReportSeverity,
    pub status: ReportStatus,
    pub source: ReportSource,
    pub verified: bool,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MapFeature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub geometry: PointGeometry,
    pub properties: MapFeatureProperties,
}

impl From<&Report> for MapFeature {
    fn from(r: &Report) -> Self {
        Self {
            feature_type: "Feature".to_string(),
            geometry: PointGeometry {
                geometry_type: "Point".to_string(),
                coordinates: [r.location_lng, r.location_lat],
            },
            properties: MapFeatureProperties {
                id: r.id,
                hazard_type: r.hazard_type,
                title: r.title.clone(),
                description: r.description.clone(),
                severity: r.severity,
                status: r.status,
                source: r.source,
                verified: r.verified,
                address: r.location_address.clone(),
                created_at: r.created_at,
            },
        }
    }
}

/// Map overlay data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<MapFeature>,
}

/// Query params for map data (same filters as the listing, no pagination)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct MapQueryParams {
    #[serde(rename = "type")]
    pub hazard_type: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub verified: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
}

impl MapQueryParams {
    pub fn to_filter(&self) -> Result<ReportFilter, AppError> {
        ReportQueryParams {
            hazard_type: self.hazard_type.clone(),
            severity: self.severity.clone(),
            status: self.status.clone(),
            source: self.source.clone(),
            verified: self.verified,
            start_date: self.start_date,
            end_date: self.end_date,
            lat: self.lat,
            lng: self.lng,
            radius_km: self.radius_km,
            page: None,
            page_size: None,
        }
        .to_filter()
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Aggregate report counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportStatsDto {
    pub total_reports: i64,
    pub verified_reports: i64,
    pub critical_reports: i64,
    pub high_severity_reports: i64,
    pub reports_last_24h: i64,
    pub reports_last_7d: i64,
    pub tsunami_reports: i64,
    pub high_waves_reports: i64,
    pub storm_surge_reports: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ReportQueryParams {
        ReportQueryParams::default()
    }

    #[test]
    fn test_empty_params_build_empty_filter() {
        let filter = params().to_filter().unwrap();
        assert_eq!(filter, ReportFilter::default());
        assert_eq!(params().pagination().page, 1);
        assert_eq!(params().pagination().page_size, 20);
    }

    #[test]
    fn test_invalid_enum_value_is_rejected() {
        let p = ReportQueryParams {
            severity: Some("extreme".to_string()),
            ..params()
        };
        match p.to_filter() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("severity")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let p = ReportQueryParams {
            hazard_type: Some("Tsunami".to_string()),
            ..params()
        };
        assert!(matches!(p.to_filter(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_center_requires_both_coordinates() {
        let p = ReportQueryParams {
            lat: Some(13.08),
            ..params()
        };
        assert!(matches!(p.to_filter(), Err(AppError::Validation(_))));

        let p = ReportQueryParams {
            radius_km: Some(5.0),
            ..params()
        };
        assert!(matches!(p.to_filter(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_center_defaults_radius_and_validates_range() {
        let p = ReportQueryParams {
            lat: Some(13.08),
            lng: Some(80.27),
            ..params()
        };
        let near = p.to_filter().unwrap().near.unwrap();
        assert_eq!(near.radius_km, DEFAULT_SEARCH_RADIUS_KM);

        let p = ReportQueryParams {
            lat: Some(95.0),
            lng: Some(80.27),
            ..params()
        };
        assert!(matches!(p.to_filter(), Err(AppError::Validation(_))));

        let p = ReportQueryParams {
            lat: Some(13.08),
            lng: Some(80.27),
            radius_km: Some(-1.0),
            ..params()
        };
        assert!(matches!(p.to_filter(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_inverted_date_range_is_rejected() {
        let now = Utc::now();
        let p = ReportQueryParams {
            start_date: Some(now),
            end_date: Some(now - chrono::Duration::days(1)),
            ..params()
        };
        assert!(matches!(p.to_filter(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_create_dto_validation() {
        let dto = CreateReportDto {
            hazard_type: HazardType::Tsunami,
            title: "Big wave".to_string(),
            description: "Water receding fast from the beach".to_string(),
            location: LocationDto {
                lat: 91.0,
                lng: 80.0,
                address: "Marina Beach, Chennai".to_string(),
            },
            severity: ReportSeverity::High,
            reporter_name: None,
            reporter_contact: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateReportDto {
            location: LocationDto {
                lat: 13.05,
                ..dto.location
            },
            ..dto
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_map_feature_uses_lng_lat_order() {
        let report = crate::shared::test_helpers::report_at(
            HazardType::Tsunami,
            ReportSeverity::Critical,
            13.0827,
            80.2707,
            Utc::now(),
        );
        let feature = MapFeature::from(&report);
        assert_eq!(feature.geometry.coordinates, [80.2707, 13.0827]);
        assert_eq!(feature.geometry.geometry_type, "Point");
        assert_eq!(feature.properties.id, report.id);

        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["properties"]["type"], "tsunami");
    }
}
