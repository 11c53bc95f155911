use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::geo::GeoPoint;

/// Error returned when a wire value does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}', expected one of: {expected}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Hazard type enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "hazard_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum HazardType {
    Tsunami,
    HighWaves,
    StormSurge,
    CoastalDamage,
    UnusualTides,
    SwellSurge,
}

impl HazardType {
    pub const ALL: [HazardType; 6] = [
        HazardType::Tsunami,
        HazardType::HighWaves,
        HazardType::StormSurge,
        HazardType::CoastalDamage,
        HazardType::UnusualTides,
        HazardType::SwellSurge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardType::Tsunami => "tsunami",
            HazardType::HighWaves => "high-waves",
            HazardType::StormSurge => "storm-surge",
            HazardType::CoastalDamage => "coastal-damage",
            HazardType::UnusualTides => "unusual-tides",
            HazardType::SwellSurge => "swell-surge",
        }
    }
}

impl std::fmt::Display for HazardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HazardType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HazardType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "type",
                value: s.to_string(),
                expected: "tsunami, high-waves, storm-surge, coastal-damage, unusual-tides, swell-surge",
            })
    }
}

/// Report severity enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for ReportSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSeverity::Low => write!(f, "low"),
            ReportSeverity::Medium => write!(f, "medium"),
            ReportSeverity::High => write!(f, "high"),
            ReportSeverity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for ReportSeverity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ReportSeverity::Low),
            "medium" => Ok(ReportSeverity::Medium),
            "high" => Ok(ReportSeverity::High),
            "critical" => Ok(ReportSeverity::Critical),
            _ => Err(UnknownVariant {
                kind: "severity",
                value: s.to_string(),
                expected: "low, medium, high, critical",
            }),
        }
    }
}

/// Report review status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Received,
    UnderReview,
    Verified,
    Rejected,
}

impl ReportStatus {
    /// `verified` flag that must accompany this status
    pub fn is_verified(&self) -> bool {
        matches!(self, ReportStatus::Verified)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Received => write!(f, "received"),
            ReportStatus::UnderReview => write!(f, "under-review"),
            ReportStatus::Verified => write!(f, "verified"),
            ReportStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(ReportStatus::Received),
            "under-review" => Ok(ReportStatus::UnderReview),
            "verified" => Ok(ReportStatus::Verified),
            "rejected" => Ok(ReportStatus::Rejected),
            _ => Err(UnknownVariant {
                kind: "status",
                value: s.to_string(),
                expected: "received, under-review, verified, rejected",
            }),
        }
    }
}

/// Who produced the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Citizen,
    Official,
    Social,
}

impl std::fmt::Display for ReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSource::Citizen => write!(f, "citizen"),
            ReportSource::Official => write!(f, "official"),
            ReportSource::Social => write!(f, "social"),
        }
    }
}

impl std::str::FromStr for ReportSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(ReportSource::Citizen),
            "official" => Ok(ReportSource::Official),
            "social" => Ok(ReportSource::Social),
            _ => Err(UnknownVariant {
                kind: "source",
                value: s.to_string(),
                expected: "citizen, official, social",
            }),
        }
    }
}

/// Database model for a hazard report
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub reporter_name: String,
    pub reporter_contact: Option<String>,
    pub hazard_type: HazardType,
    pub title: String,
    pub description: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub location_address: String,
    pub severity: ReportSeverity,
    pub status: ReportStatus,
    pub source: ReportSource,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.location_lat,
            lng: self.location_lng,
        }
    }
}

/// Data for creating a new report
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub user_id: Option<String>,
    pub reporter_name: String,
    pub reporter_contact: Option<String>,
    pub hazard_type: HazardType,
    pub title: String,
    pub description: String,
    pub location: GeoPoint,
    pub location_address: String,
    pub severity: ReportSeverity,
    pub source: ReportSource,
}

/// Status transition requested by an official
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: ReportStatus,
    pub changed_by: String,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazard_type_round_trips_through_str() {
        for t in HazardType::ALL {
            assert_eq!(t.as_str().parse::<HazardType>(), Ok(t));
        }
    }

    #[test]
    fn test_unknown_variant_names_field() {
        let err = "tsunamii".parse::<HazardType>().unwrap_err();
        assert_eq!(err.kind, "type");
        assert!(err.to_string().contains("tsunamii"));

        assert!("Critical".parse::<ReportSeverity>().is_err());
        assert!("under_review".parse::<ReportStatus>().is_err());
        assert!("twitter".parse::<ReportSource>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&HazardType::StormSurge).unwrap();
        assert_eq!(json, "\"storm-surge\"");
        let status: ReportStatus = serde_json::from_str("\"under-review\"").unwrap();
        assert_eq!(status, ReportStatus::UnderReview);
    }
}
