mod proximity_service;
mod report_query_service;
mod report_service;

pub use proximity_service::{
    DuplicateMatch, ProximityConfig, ProximityMatcher, DEFAULT_DUPLICATE_RADIUS_KM,
    DEFAULT_DUPLICATE_WINDOW_MINUTES,
};
pub use report_query_service::{
    compute_stats, map_features, query_reports, RadiusFilter, ReportFilter, ReportPage,
};
pub use report_service::ReportService;
