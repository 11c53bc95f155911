use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportService;

/// Routes open to guests. Submission picks up the signed-in user when the
/// caller layers the optional auth middleware on top.
pub fn public_routes(report_service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/api/reports",
            post(handlers::create_report).get(handlers::list_reports),
        )
        .route("/api/reports/duplicates", post(handlers::check_duplicates))
        .route("/api/reports/map/data", get(handlers::get_map_data))
        .route("/api/reports/stats/overview", get(handlers::get_stats))
        .route("/api/reports/{id}", get(handlers::get_report))
        .with_state(report_service)
}

/// Routes reserved to officials (require JWT plus the official role)
pub fn protected_routes(report_service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/api/reports/{id}/status",
            put(handlers::update_report_status),
        )
        .route(
            "/api/reports/{id}/verifications",
            get(handlers::list_verifications),
        )
        .with_state(report_service)
}
