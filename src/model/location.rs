use serde::{Deserialize, Serialize};

/// Mean Earth radius used to turn a distance into radians.
pub const EARTH_RADIUS_KM: f64 = 6378.0;

/// GeoJSON point with the address parts a geocoder reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type", default = "point_kind")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

fn point_kind() -> String {
    "Point".to_string()
}

impl Location {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: point_kind(),
            coordinates: [longitude, latitude],
            formatted_address: None,
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Spherical cap: every point within `radius` radians of `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// `[longitude, latitude]` in degrees
    pub center: [f64; 2],
    pub radius: f64,
}

impl Sphere {
    pub fn around(center: &Location, distance_km: f64) -> Self {
        Self {
            center: center.coordinates,
            radius: distance_km / EARTH_RADIUS_KM,
        }
    }

    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        central_angle(self.center, [longitude, latitude]) <= self.radius
    }
}

/// Great-circle angle in radians between two `[longitude, latitude]` points
/// (haversine).
pub fn central_angle(a: [f64; 2], b: [f64; 2]) -> f64 {
    let (lat_a, lat_b) = (a[1].to_radians(), b[1].to_radians());
    let d_lat = lat_b - lat_a;
    let d_lng = (b[0] - a[0]).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}
