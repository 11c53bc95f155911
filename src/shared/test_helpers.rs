#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use crate::features::reports::models::{
    HazardType, Report, ReportSeverity, ReportSource, ReportStatus,
};

#[cfg(test)]
use crate::shared::constants::ROLE_OFFICIAL;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
use chrono::{DateTime, Duration, Utc};

#[cfg(test)]
use fake::{
    faker::{
        address::en::CityName,
        lorem::en::{Paragraph, Sentence},
        name::en::Name,
    },
    Fake,
};

#[cfg(test)]
use uuid::Uuid;

/// Report of the given type and severity at a fixed point and time, with
/// generated text. Status starts as `received`.
#[cfg(test)]
pub fn report_at(
    hazard_type: HazardType,
    severity: ReportSeverity,
    lat: f64,
    lng: f64,
    created_at: DateTime<Utc>,
) -> Report {
    Report {
        id: Uuid::new_v4(),
        user_id: None,
        reporter_name: Name().fake(),
        reporter_contact: Some("reporter@example.com".to_string()),
        hazard_type,
        title: Sentence(3..6).fake(),
        description: Paragraph(1..3).fake(),
        location_lat: lat,
        location_lng: lng,
        location_address: CityName().fake(),
        severity,
        status: ReportStatus::Received,
        source: ReportSource::Citizen,
        verified: false,
        created_at,
        updated_at: created_at,
    }
}

/// `count` reports spread along the Indian coastline, cycling hazard types
/// and severities. Every third report shares its timestamp with the
/// previous one so ordering ties are exercised.
#[cfg(test)]
pub fn sample_reports(count: usize, now: DateTime<Utc>) -> Vec<Report> {
    const SEVERITIES: [ReportSeverity; 4] = [
        ReportSeverity::Low,
        ReportSeverity::Medium,
        ReportSeverity::High,
        ReportSeverity::Critical,
    ];

    (0..count)
        .map(|i| {
            let hazard_type = HazardType::ALL[i % HazardType::ALL.len()];
            let severity = SEVERITIES[i % SEVERITIES.len()];
            let lat = 8.0 + (i % 15) as f64;
            let lng = 72.0 + (i % 9) as f64;
            let created_at = now - Duration::minutes((i - i / 3) as i64);
            report_at(hazard_type, severity, lat, lng, created_at)
        })
        .collect()
}

#[cfg(test)]
pub fn official_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "official-sub".to_string(),
        name: Some("Coast Guard Desk".to_string()),
        roles: vec![ROLE_OFFICIAL.to_string()],
    }
}

#[cfg(test)]
pub fn citizen_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "citizen-sub".to_string(),
        name: Some("Asha".to_string()),
        roles: vec!["citizen".to_string()],
    }
}

#[cfg(test)]
async fn inject_official_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(official_user());
    next.run(request).await
}

#[cfg(test)]
async fn inject_citizen_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(citizen_user());
    next.run(request).await
}

#[cfg(test)]
pub fn with_official_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_official_middleware))
}

#[cfg(test)]
pub fn with_citizen_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_citizen_middleware))
}
