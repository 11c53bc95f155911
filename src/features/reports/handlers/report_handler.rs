use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireOfficial;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    CreateReportDto, CreateReportResponseDto, DuplicateCheckDto, DuplicateReportDto,
    FeatureCollection, MapQueryParams, ReportListDto, ReportQueryParams, ReportResponseDto,
    ReportStatsDto, ReportVerificationDto, UpdateReportStatusDto,
};
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, Meta};

/// Submit a hazard report (signed in or as a guest)
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report submitted", body = ApiResponse<CreateReportResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "reports"
)]
pub async fn create_report(
    State(service): State<Arc<ReportService>>,
    user: Option<AuthenticatedUser>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<CreateReportResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (report, duplicates) = service.submit(dto, user.as_ref(), Utc::now()).await?;

    let dto = CreateReportResponseDto {
        report: report.into(),
        duplicates,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(dto),
            Some("Report submitted successfully".to_string()),
            None,
        )),
    ))
}

/// Check for recent nearby reports of the same type before submitting
#[utoipa::path(
    post,
    path = "/api/reports/duplicates",
    request_body = DuplicateCheckDto,
    responses(
        (status = 200, description = "Possible duplicates, nearest first", body = ApiResponse<Vec<DuplicateReportDto>>),
        (status = 400, description = "Validation error")
    ),
    tag = "reports"
)]
pub async fn check_duplicates(
    State(service): State<Arc<ReportService>>,
    AppJson(dto): AppJson<DuplicateCheckDto>,
) -> Result<Json<ApiResponse<Vec<DuplicateReportDto>>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let duplicates = service.check_duplicates(&dto, Utc::now()).await?;
    let total = duplicates.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(duplicates),
        None,
        Some(Meta { total }),
    )))
}

/// List reports with filters and pagination
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportQueryParams),
    responses(
        (status = 200, description = "Paginated reports, newest first", body = ApiResponse<ReportListDto>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(service): State<Arc<ReportService>>,
    AppQuery(params): AppQuery<ReportQueryParams>,
) -> Result<Json<ApiResponse<ReportListDto>>> {
    let filter = params.to_filter()?;
    let page = service.list(&filter, &params.pagination()).await?;

    let total = page.pagination.total_count;
    let dto = ReportListDto {
        items: page.items.into_iter().map(ReportResponseDto::from).collect(),
        pagination: page.pagination,
    };
    Ok(Json(ApiResponse::success(
        Some(dto),
        None,
        Some(Meta { total }),
    )))
}

/// Get report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Update report status (officials only)
#[utoipa::path(
    put,
    path = "/api/reports/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Official access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report_status(
    RequireOfficial(user): RequireOfficial,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = service.update_status(id, dto, &user).await?;
    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report status updated successfully".to_string()),
        None,
    )))
}

/// Verification history of a report (officials only)
#[utoipa::path(
    get,
    path = "/api/reports/{id}/verifications",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Verification records, oldest first", body = ApiResponse<Vec<ReportVerificationDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Official access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_verifications(
    RequireOfficial(_user): RequireOfficial,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ReportVerificationDto>>>> {
    let records = service.list_verifications(id).await?;
    let dtos: Vec<ReportVerificationDto> = records.into_iter().map(|v| v.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Reports as map point features (at most 1000, newest first)
#[utoipa::path(
    get,
    path = "/api/reports/map/data",
    params(MapQueryParams),
    responses(
        (status = 200, description = "Map feature collection", body = ApiResponse<FeatureCollection>),
        (status = 400, description = "Invalid filter value")
    ),
    tag = "reports"
)]
pub async fn get_map_data(
    State(service): State<Arc<ReportService>>,
    AppQuery(params): AppQuery<MapQueryParams>,
) -> Result<Json<ApiResponse<FeatureCollection>>> {
    let filter = params.to_filter()?;
    let data = service.map_data(&filter).await?;
    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Report statistics overview
#[utoipa::path(
    get,
    path = "/api/reports/stats/overview",
    responses(
        (status = 200, description = "Report statistics", body = ApiResponse<ReportStatsDto>)
    ),
    tag = "reports"
)]
pub async fn get_stats(
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<ReportStatsDto>>> {
    let stats = service.stats(Utc::now()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, Router};
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::features::reports::models::{HazardType, Report, ReportSeverity};
    use crate::features::reports::routes;
    use crate::features::reports::{InMemoryReportStore, ProximityMatcher, ReportService};
    use crate::shared::test_helpers::{report_at, with_citizen_auth, with_official_auth};

    enum Caller {
        Guest,
        Citizen,
        Official,
    }

    fn server(reports: Vec<Report>, caller: Caller) -> TestServer {
        let service = Arc::new(ReportService::new(
            Arc::new(InMemoryReportStore::with_reports(reports)),
            ProximityMatcher::default(),
        ));
        let app = Router::new()
            .merge(routes::public_routes(Arc::clone(&service)))
            .merge(routes::protected_routes(service));
        let app = match caller {
            Caller::Guest => app,
            Caller::Citizen => with_citizen_auth(app),
            Caller::Official => with_official_auth(app),
        };
        TestServer::new(app).unwrap()
    }

    fn guest_submission(lat: f64, lng: f64) -> Value {
        json!({
            "type": "high-waves",
            "title": "Waves over the sea wall",
            "description": "Waves are breaking over the promenade wall",
            "location": { "lat": lat, "lng": lng, "address": "Marine Drive" },
            "severity": "high",
            "reporter_name": "Meera",
            "reporter_contact": "+91 98765 43210"
        })
    }

    #[tokio::test]
    async fn test_radius_filter_keeps_chennai_and_drops_mumbai() {
        let now = Utc::now();
        let chennai = report_at(HazardType::Tsunami, ReportSeverity::High, 13.0827, 80.2707, now);
        let mumbai = report_at(HazardType::Tsunami, ReportSeverity::High, 19.0760, 72.8777, now);
        let server = server(vec![chennai.clone(), mumbai], Caller::Guest);

        let response = server
            .get("/api/reports")
            .add_query_param("lat", 13.08)
            .add_query_param("lng", 80.27)
            .add_query_param("radius_km", 50)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["total_count"], 1);
        assert_eq!(body["data"]["items"][0]["id"], chennai.id.to_string());
        assert_eq!(body["meta"]["total"], 1);
    }

    #[tokio::test]
    async fn test_unknown_filter_value_is_rejected() {
        let server = server(Vec::new(), Caller::Guest);

        let response = server
            .get("/api/reports")
            .add_query_param("severity", "extreme")
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("severity"));
    }

    #[tokio::test]
    async fn test_huge_page_number_returns_empty_page() {
        let now = Utc::now();
        let server = server(
            vec![report_at(HazardType::Tsunami, ReportSeverity::Low, 13.0, 80.0, now)],
            Caller::Guest,
        );

        let response = server
            .get("/api/reports")
            .add_query_param("page", i64::MAX)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
        assert_eq!(body["data"]["total_count"], 1);
    }

    #[tokio::test]
    async fn test_malformed_query_number_is_rejected() {
        let server = server(Vec::new(), Caller::Guest);

        let response = server
            .get("/api/reports/map/data")
            .add_query_param("lat", "north")
            .add_query_param("lng", 80.0)
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_guest_submission_reports_duplicates() {
        let server = server(Vec::new(), Caller::Guest);

        let first = server
            .post("/api/reports")
            .json(&guest_submission(18.9220, 72.8347))
            .await;
        first.assert_status(StatusCode::CREATED);
        let first: Value = first.json();
        assert_eq!(first["data"]["report"]["source"], "citizen");
        assert_eq!(first["data"]["report"]["status"], "received");
        assert_eq!(first["data"]["duplicates"].as_array().unwrap().len(), 0);

        let second = server
            .post("/api/reports")
            .json(&guest_submission(18.9221, 72.8348))
            .await;
        second.assert_status(StatusCode::CREATED);
        let second: Value = second.json();
        let duplicates = second["data"]["duplicates"].as_array().unwrap();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0]["id"], first["data"]["report"]["id"]);
    }

    #[tokio::test]
    async fn test_invalid_submission_is_rejected() {
        let server = server(Vec::new(), Caller::Guest);
        let mut body = guest_submission(95.0, 72.0);
        body["title"] = json!("Hi");

        let response = server.post("/api/reports").json(&body).await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_signed_in_official_submission_is_official_source() {
        let server = server(Vec::new(), Caller::Official);
        let mut body = guest_submission(13.0, 80.0);
        body.as_object_mut().unwrap().remove("reporter_contact");

        let response = server.post("/api/reports").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["report"]["source"], "official");
    }

    #[tokio::test]
    async fn test_official_verifies_report_with_notes() {
        let report = report_at(
            HazardType::StormSurge,
            ReportSeverity::Critical,
            13.0,
            80.0,
            Utc::now() - Duration::hours(1),
        );
        let server = server(vec![report.clone()], Caller::Official);

        let response = server
            .put(&format!("/api/reports/{}/status", report.id))
            .json(&json!({ "status": "verified", "verification_notes": "Confirmed by patrol" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "verified");
        assert_eq!(body["data"]["verified"], true);

        let trail = server
            .get(&format!("/api/reports/{}/verifications", report.id))
            .await;
        trail.assert_status_ok();
        let trail: Value = trail.json();
        let records = trail["data"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["verification_notes"], "Confirmed by patrol");
        assert_eq!(records[0]["verified_by"], "official-sub");
    }

    #[tokio::test]
    async fn test_status_update_requires_official() {
        let report = report_at(HazardType::Tsunami, ReportSeverity::Low, 13.0, 80.0, Utc::now());
        let path = format!("/api/reports/{}/status", report.id);
        let body = json!({ "status": "rejected" });

        server(vec![report.clone()], Caller::Citizen)
            .put(&path)
            .json(&body)
            .await
            .assert_status_forbidden();

        server(vec![report], Caller::Guest)
            .put(&path)
            .json(&body)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_unknown_report_is_not_found() {
        let server = server(Vec::new(), Caller::Guest);
        let response = server
            .get(&format!("/api/reports/{}", uuid::Uuid::now_v7()))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_map_data_uses_lng_lat_order() {
        let report = report_at(HazardType::SwellSurge, ReportSeverity::Medium, 9.93, 76.26, Utc::now());
        let server = server(vec![report], Caller::Guest);

        let response = server
            .get("/api/reports/map/data")
            .add_query_param("type", "swell-surge")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["type"], "FeatureCollection");
        assert_eq!(
            body["data"]["features"][0]["geometry"]["coordinates"],
            json!([76.26, 9.93])
        );
        assert_eq!(body["data"]["features"][0]["properties"]["type"], "swell-surge");
    }

    #[tokio::test]
    async fn test_stats_overview() {
        let now = Utc::now();
        let server = server(
            vec![
                report_at(HazardType::Tsunami, ReportSeverity::Critical, 0.0, 0.0, now),
                report_at(
                    HazardType::HighWaves,
                    ReportSeverity::High,
                    0.0,
                    0.0,
                    now - Duration::days(3),
                ),
            ],
            Caller::Guest,
        );

        let response = server.get("/api/reports/stats/overview").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["total_reports"], 2);
        assert_eq!(body["data"]["critical_reports"], 1);
        assert_eq!(body["data"]["reports_last_24h"], 1);
        assert_eq!(body["data"]["reports_last_7d"], 2);
        assert_eq!(body["data"]["tsunami_reports"], 1);
    }
}
