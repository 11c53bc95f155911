use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Mean Earth radius in kilometers (spherical model)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    #[error("coordinates must be finite numbers")]
    NonFinite,

    #[error("latitude {0} is outside -90..90")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside -180..180")]
    LongitudeOutOfRange(f64),
}

/// A validated WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GeoError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Great-circle distance to another point in kilometers
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Haversine distance between two lat/lng points (degrees) in kilometers.
///
/// The intermediate term is clamped into [0, 1] so rounding on coincident or
/// antipodal points never pushes `asin` out of its domain.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Padding applied to box half-widths so points on the circle edge survive
/// floating point error
const BOX_PADDING: f64 = 1.1;

/// Coarse lat/lng box enclosing a search circle, used as a SQL prefilter
/// before the exact haversine check.
///
/// `lng_range` is `None` when the circle reaches a pole or crosses the
/// antimeridian; only the latitude band applies then.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub lng_range: Option<(f64, f64)>,
}

pub fn bounding_box(center: &GeoPoint, radius_km: f64) -> BoundingBox {
    let angular = radius_km / EARTH_RADIUS_KM;
    let lat_delta = angular.to_degrees() * BOX_PADDING;

    let min_lat = (center.lat - lat_delta).max(-90.0);
    let max_lat = (center.lat + lat_delta).min(90.0);

    // A circle containing a pole spans every longitude
    if center.lat.abs() + lat_delta >= 90.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            lng_range: None,
        };
    }

    // Widest longitude reached by a small circle at this latitude
    let ratio = (angular.sin() / center.lat.to_radians().cos()).min(1.0);
    let lng_delta = ratio.asin().to_degrees() * BOX_PADDING;

    let (min_lng, max_lng) = (center.lng - lng_delta, center.lng + lng_delta);
    let lng_range = (min_lng >= -180.0 && max_lng <= 180.0).then_some((min_lng, max_lng));

    BoundingBox {
        min_lat,
        max_lat,
        lng_range,
    }
}
