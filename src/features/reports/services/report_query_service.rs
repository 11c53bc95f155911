use chrono::{DateTime, Duration, Utc};

use crate::features::reports::dtos::{FeatureCollection, MapFeature, ReportStatsDto};
use crate::features::reports::models::{
    HazardType, Report, ReportSeverity, ReportSource, ReportStatus,
};
use crate::shared::constants::MAP_MAX_FEATURES;
use crate::shared::geo::GeoPoint;
use crate::shared::types::{PaginationMeta, PaginationQuery};

/// Geospatial containment: distance from `center` <= `radius_km`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusFilter {
    pub center: GeoPoint,
    pub radius_km: f64,
}

impl RadiusFilter {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.distance_km(point) <= self.radius_km
    }
}

/// Filter set for report queries. `None` means no constraint on that field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub hazard_type: Option<HazardType>,
    pub severity: Option<ReportSeverity>,
    pub status: Option<ReportStatus>,
    pub source: Option<ReportSource>,
    pub verified: Option<bool>,
    /// Inclusive
    pub created_after: Option<DateTime<Utc>>,
    /// Inclusive
    pub created_before: Option<DateTime<Utc>>,
    pub near: Option<RadiusFilter>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        self.hazard_type.is_none_or(|t| report.hazard_type == t)
            && self.severity.is_none_or(|s| report.severity == s)
            && self.status.is_none_or(|s| report.status == s)
            && self.source.is_none_or(|s| report.source == s)
            && self.verified.is_none_or(|v| report.verified == v)
            && self.created_after.is_none_or(|t| report.created_at >= t)
            && self.created_before.is_none_or(|t| report.created_at <= t)
            && self
                .near
                .as_ref()
                .is_none_or(|near| near.contains(&report.location()))
    }
}

/// One page of a filtered, recency-sorted report listing
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    pub items: Vec<Report>,
    pub pagination: PaginationMeta,
}

/// Newest first; ties broken by id descending so paging is deterministic
fn recency_order(a: &Report, b: &Report) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

fn filtered_sorted<'a>(snapshot: &'a [Report], filter: &ReportFilter) -> Vec<&'a Report> {
    let mut matching: Vec<&Report> = snapshot.iter().filter(|r| filter.matches(r)).collect();
    matching.sort_by(|a, b| recency_order(a, b));
    matching
}

/// Filter, sort and paginate a snapshot of reports
pub fn query_reports(
    snapshot: &[Report],
    filter: &ReportFilter,
    pagination: &PaginationQuery,
) -> ReportPage {
    let matching = filtered_sorted(snapshot, filter);
    let meta = PaginationMeta::new(pagination, matching.len() as i64);

    let items = matching
        .into_iter()
        .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(pagination.limit()).unwrap_or(usize::MAX))
        .cloned()
        .collect();

    ReportPage {
        items,
        pagination: meta,
    }
}

/// Filter and sort a snapshot into map features, capped at `MAP_MAX_FEATURES`
pub fn map_features(snapshot: &[Report], filter: &ReportFilter) -> FeatureCollection {
    let features = filtered_sorted(snapshot, filter)
        .into_iter()
        .take(MAP_MAX_FEATURES)
        .map(MapFeature::from)
        .collect();

    FeatureCollection {
        collection_type: "FeatureCollection".to_string(),
        features,
    }
}

fn count_where(snapshot: &[Report], pred: impl Fn(&Report) -> bool) -> i64 {
    snapshot.iter().filter(|r| pred(r)).count() as i64
}

/// Count reports by status, severity, age and type
pub fn compute_stats(snapshot: &[Report], now: DateTime<Utc>) -> ReportStatsDto {
    let day_ago = now - Duration::hours(24);
    let week_ago = now - Duration::days(7);
    ReportStatsDto {
        total_reports: snapshot.len() as i64,
        verified_reports: count_where(snapshot, |r| r.status == ReportStatus::Verified),
        critical_reports: count_where(snapshot, |r| r.severity == ReportSeverity::Critical),
        high_severity_reports: count_where(snapshot, |r| r.severity == ReportSeverity::High),
        reports_last_24h: count_where(snapshot, |r| r.created_at >= day_ago),
        reports_last_7d: count_where(snapshot, |r| r.created_at >= week_ago),
        tsunami_reports: count_where(snapshot, |r| r.hazard_type == HazardType::Tsunami),
        high_waves_reports: count_where(snapshot, |r| r.hazard_type == HazardType::HighWaves),
        storm_surge_reports: count_where(snapshot, |r| r.hazard_type == HazardType::StormSurge),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{report_at, sample_reports};
    use std::collections::HashSet;

    #[test]
    fn test_filter_by_severity_critical() {
        let now = Utc::now();
        let severities = [
            ReportSeverity::Critical,
            ReportSeverity::Low,
            ReportSeverity::Critical,
            ReportSeverity::Medium,
            ReportSeverity::High,
            ReportSeverity::Low,
            ReportSeverity::Critical,
            ReportSeverity::Medium,
            ReportSeverity::High,
            ReportSeverity::Low,
        ];
        let snapshot: Vec<Report> = severities
            .iter()
            .enumerate()
            .map(|(i, s)| {
                report_at(
                    HazardType::HighWaves,
                    *s,
                    10.0 + i as f64,
                    75.0,
                    now - Duration::minutes(i as i64),
                )
            })
            .collect();

        let filter = ReportFilter {
            severity: Some(ReportSeverity::Critical),
            ..Default::default()
        };
        let page = query_reports(&snapshot, &filter, &PaginationQuery::default());

        assert_eq!(page.pagination.total_count, 3);
        assert_eq!(page.items.len(), 3);
        assert!(page
            .items
            .iter()
            .all(|r| r.severity == ReportSeverity::Critical));
    }

    #[test]
    fn test_pages_concatenate_to_full_sorted_set() {
        let now = Utc::now();
        let snapshot = sample_reports(47, now);
        let filter = ReportFilter {
            hazard_type: Some(HazardType::Tsunami),
            ..Default::default()
        };
        let expected: Vec<_> = filtered_sorted(&snapshot, &filter)
            .into_iter()
            .map(|r| r.id)
            .collect();

        let first = query_reports(&snapshot, &filter, &PaginationQuery::new(1, 7));
        let mut collected = Vec::new();
        for page in 1..=first.pagination.total_pages {
            let p = query_reports(&snapshot, &filter, &PaginationQuery::new(page, 7));
            assert_eq!(p.pagination.total_count, expected.len() as i64);
            collected.extend(p.items.into_iter().map(|r| r.id));
        }

        assert_eq!(collected, expected);
        let unique: HashSet<_> = collected.iter().collect();
        assert_eq!(unique.len(), collected.len());
    }

    #[test]
    fn test_ordering_newest_first_ties_by_id_desc() {
        let now = Utc::now();
        let mut a = report_at(HazardType::Tsunami, ReportSeverity::Low, 0.0, 0.0, now);
        let mut b = report_at(HazardType::Tsunami, ReportSeverity::Low, 0.0, 0.0, now);
        let older = report_at(
            HazardType::Tsunami,
            ReportSeverity::Low,
            0.0,
            0.0,
            now - Duration::seconds(1),
        );
        a.id = uuid::Uuid::from_u128(1);
        b.id = uuid::Uuid::from_u128(2);

        let snapshot = vec![older.clone(), a.clone(), b.clone()];
        let page = query_reports(&snapshot, &ReportFilter::default(), &PaginationQuery::default());
        let ids: Vec<_> = page.items.iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![b.id, a.id, older.id]);
    }

    #[test]
    fn test_zero_radius_matches_only_exact_center() {
        let now = Utc::now();
        let snapshot = vec![
            report_at(HazardType::Tsunami, ReportSeverity::Low, 13.0, 80.0, now),
            report_at(HazardType::Tsunami, ReportSeverity::Low, 13.0001, 80.0, now),
            report_at(HazardType::StormSurge, ReportSeverity::Low, 13.0, 80.0, now),
        ];
        let filter = ReportFilter {
            near: Some(RadiusFilter {
                center: GeoPoint::new(13.0, 80.0).unwrap(),
                radius_km: 0.0,
            }),
            ..Default::default()
        };

        let page = query_reports(&snapshot, &filter, &PaginationQuery::default());
        assert_eq!(page.pagination.total_count, 2);
        assert!(page
            .items
            .iter()
            .all(|r| r.location_lat == 13.0 && r.location_lng == 80.0));
    }

    #[test]
    fn test_chennai_radius_excludes_mumbai() {
        let now = Utc::now();
        let chennai = report_at(HazardType::Tsunami, ReportSeverity::High, 13.0827, 80.2707, now);
        let mumbai = report_at(HazardType::Tsunami, ReportSeverity::High, 19.0760, 72.8777, now);
        let snapshot = vec![chennai.clone(), mumbai];

        let filter = ReportFilter {
            near: Some(RadiusFilter {
                center: GeoPoint::new(13.08, 80.27).unwrap(),
                radius_km: 50.0,
            }),
            ..Default::default()
        };
        let page = query_reports(&snapshot, &filter, &PaginationQuery::default());

        assert_eq!(page.pagination.total_count, 1);
        assert_eq!(page.items[0].id, chennai.id);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let now = Utc::now();
        let start = now - Duration::hours(2);
        let snapshot = vec![
            report_at(HazardType::Tsunami, ReportSeverity::Low, 0.0, 0.0, start),
            report_at(HazardType::Tsunami, ReportSeverity::Low, 0.0, 0.0, now),
            report_at(
                HazardType::Tsunami,
                ReportSeverity::Low,
                0.0,
                0.0,
                start - Duration::seconds(1),
            ),
        ];
        let filter = ReportFilter {
            created_after: Some(start),
            created_before: Some(now),
            ..Default::default()
        };

        let page = query_reports(&snapshot, &filter, &PaginationQuery::default());
        assert_eq!(page.pagination.total_count, 2);
    }

    #[test]
    fn test_combined_predicates() {
        let now = Utc::now();
        let mut verified = report_at(HazardType::CoastalDamage, ReportSeverity::High, 0.0, 0.0, now);
        verified.status = ReportStatus::Verified;
        verified.verified = true;
        verified.source = ReportSource::Official;
        let plain = report_at(HazardType::CoastalDamage, ReportSeverity::High, 0.0, 0.0, now);
        let snapshot = vec![verified.clone(), plain];

        let filter = ReportFilter {
            hazard_type: Some(HazardType::CoastalDamage),
            status: Some(ReportStatus::Verified),
            source: Some(ReportSource::Official),
            verified: Some(true),
            ..Default::default()
        };
        let page = query_reports(&snapshot, &filter, &PaginationQuery::default());
        assert_eq!(page.items, vec![verified]);

        let unverified = ReportFilter {
            verified: Some(false),
            ..Default::default()
        };
        assert_eq!(
            query_reports(&snapshot, &unverified, &PaginationQuery::default())
                .pagination
                .total_count,
            1
        );
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let snapshot = sample_reports(5, Utc::now());
        let page = query_reports(
            &snapshot,
            &ReportFilter::default(),
            &PaginationQuery::new(4, 20),
        );
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total_count, 5);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn test_huge_page_number_is_empty() {
        let snapshot = sample_reports(5, Utc::now());
        let page = query_reports(
            &snapshot,
            &ReportFilter::default(),
            &PaginationQuery::new(i64::MAX, 20),
        );
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.page, i64::MAX);
        assert_eq!(page.pagination.total_count, 5);
    }

    #[test]
    fn test_map_features_capped_and_sorted() {
        let now = Utc::now();
        let snapshot = sample_reports(MAP_MAX_FEATURES + 25, now);

        let collection = map_features(&snapshot, &ReportFilter::default());
        assert_eq!(collection.collection_type, "FeatureCollection");
        assert_eq!(collection.features.len(), MAP_MAX_FEATURES);
        assert!(collection
            .features
            .windows(2)
            .all(|w| w[0].properties.created_at >= w[1].properties.created_at));
    }

    #[test]
    fn test_stats_counts() {
        let now = Utc::now();
        let mut verified = report_at(HazardType::Tsunami, ReportSeverity::Critical, 0.0, 0.0, now);
        verified.status = ReportStatus::Verified;
        verified.verified = true;
        let snapshot = vec![
            verified,
            report_at(
                HazardType::HighWaves,
                ReportSeverity::High,
                0.0,
                0.0,
                now - Duration::hours(30),
            ),
            report_at(
                HazardType::StormSurge,
                ReportSeverity::Low,
                0.0,
                0.0,
                now - Duration::days(10),
            ),
            report_at(
                HazardType::UnusualTides,
                ReportSeverity::High,
                0.0,
                0.0,
                now - Duration::hours(1),
            ),
        ];

        let stats = compute_stats(&snapshot, now);
        assert_eq!(
            stats,
            ReportStatsDto {
                total_reports: 4,
                verified_reports: 1,
                critical_reports: 1,
                high_severity_reports: 2,
                reports_last_24h: 2,
                reports_last_7d: 3,
                tsunami_reports: 1,
                high_waves_reports: 1,
                storm_surge_reports: 1,
            }
        );
        assert_eq!(compute_stats(&[], now), ReportStatsDto::default());
    }
}
