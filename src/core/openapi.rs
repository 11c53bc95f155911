use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::types::{ApiResponse, Meta, PaginationMeta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports (public)
        reports_handlers::create_report,
        reports_handlers::check_duplicates,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::get_map_data,
        reports_handlers::get_stats,
        // Reports (officials)
        reports_handlers::update_report_status,
        reports_handlers::list_verifications,
    ),
    components(
        schemas(
            Meta,
            PaginationMeta,
            // Report enums
            reports_models::HazardType,
            reports_models::ReportSeverity,
            reports_models::ReportStatus,
            reports_models::ReportSource,
            // Requests
            reports_dtos::LocationDto,
            reports_dtos::CreateReportDto,
            reports_dtos::DuplicateCheckDto,
            reports_dtos::UpdateReportStatusDto,
            // Responses
            reports_dtos::ReportLocationDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::DuplicateReportDto,
            reports_dtos::CreateReportResponseDto,
            reports_dtos::ReportListDto,
            reports_dtos::ReportVerificationDto,
            reports_dtos::ReportStatsDto,
            // Map
            reports_dtos::PointGeometry,
            reports_dtos::MapFeatureProperties,
            reports_dtos::MapFeature,
            reports_dtos::FeatureCollection,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<reports_dtos::CreateReportResponseDto>,
            ApiResponse<Vec<reports_dtos::DuplicateReportDto>>,
            ApiResponse<reports_dtos::ReportListDto>,
            ApiResponse<Vec<reports_dtos::ReportVerificationDto>>,
            ApiResponse<reports_dtos::FeatureCollection>,
            ApiResponse<reports_dtos::ReportStatsDto>,
        )
    ),
    tags(
        (name = "reports", description = "Ocean hazard reports, duplicate checks, map data and statistics"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Coastwatch API",
        version = "0.1.0",
        description = "API documentation for Coastwatch",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_paths_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/reports",
            "/api/reports/duplicates",
            "/api/reports/{id}",
            "/api/reports/{id}/status",
            "/api/reports/{id}/verifications",
            "/api/reports/map/data",
            "/api/reports/stats/overview",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
