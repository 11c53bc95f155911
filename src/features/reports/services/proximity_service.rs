use chrono::{DateTime, Duration, Utc};

use crate::features::reports::models::{HazardType, Report};
use crate::shared::geo::GeoPoint;

/// Default duplicate radius in kilometers
pub const DEFAULT_DUPLICATE_RADIUS_KM: f64 = 0.2;

/// Default recency window in minutes
pub const DEFAULT_DUPLICATE_WINDOW_MINUTES: i64 = 120;

/// Thresholds deciding when two reports describe the same event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityConfig {
    pub radius_km: f64,
    pub window: Duration,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_DUPLICATE_RADIUS_KM,
            window: Duration::minutes(DEFAULT_DUPLICATE_WINDOW_MINUTES),
        }
    }
}

/// A report considered close enough to a candidate to be the same event
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch<'a> {
    pub report: &'a Report,
    pub distance_km: f64,
}

/// Finds likely duplicates of a candidate report in a snapshot.
///
/// Pure: reads the caller's snapshot and never mutates anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityMatcher {
    config: ProximityConfig,
}

impl ProximityMatcher {
    pub fn new(config: ProximityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Reports with the same hazard type, within the radius, created within the window.
    /// Ordered nearest first, then newest first.
    pub fn find_duplicates<'a>(
        &self,
        hazard_type: HazardType,
        location: &GeoPoint,
        now: DateTime<Utc>,
        existing: &'a [Report],
    ) -> Vec<DuplicateMatch<'a>> {
        let mut matches: Vec<DuplicateMatch<'a>> = existing
            .iter()
            .filter(|r| r.hazard_type == hazard_type)
            .filter(|r| now.signed_duration_since(r.created_at) <= self.config.window)
            .filter_map(|r| {
                let distance_km = location.distance_km(&r.location());
                (distance_km <= self.config.radius_km).then_some(DuplicateMatch {
                    report: r,
                    distance_km,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| b.report.created_at.cmp(&a.report.created_at))
        });

        matches
    }

    /// Same as `find_duplicates` for candidates that may still be incomplete
    /// (e.g. a form where the type or location is not chosen yet).
    pub fn find_duplicates_partial<'a>(
        &self,
        hazard_type: Option<HazardType>,
        location: Option<&GeoPoint>,
        now: DateTime<Utc>,
        existing: &'a [Report],
    ) -> Vec<DuplicateMatch<'a>> {
        match (hazard_type, location) {
            (Some(hazard_type), Some(location)) => {
                self.find_duplicates(hazard_type, location, now, existing)
            }
            _ => Vec::new(),
        }
    }
}
