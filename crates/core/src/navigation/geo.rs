//! Geographic calculations
//!
//! Great-circle distance on a spherical earth. All distance and slope
//! statistics go through [`calculate_distance`].

use crate::mission::MissionItem;

/// Earth radius in meters (WGS84 equatorial radius)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from scaled integer degrees (degrees * 1e7).
    pub fn from_scaled(lat: i32, lon: i32) -> Self {
        Self::new(lat as f64 / 1e7, lon as f64 / 1e7)
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        calculate_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl From<&MissionItem> for GeoPoint {
    fn from(item: &MissionItem) -> Self {
        GeoPoint::from_scaled(item.x, item.y)
    }
}

/// Haversine distance between two positions in meters.
///
/// # Arguments
///
/// * `lat1`, `lon1` - First position in degrees
/// * `lat2`, `lon2` - Second position in degrees
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let sin_d_phi = libm::sin(d_phi / 2.0);
    let sin_d_lambda = libm::sin(d_lambda / 2.0);
    let a = sin_d_phi * sin_d_phi + libm::cos(phi1) * libm::cos(phi2) * sin_d_lambda * sin_d_lambda;
    let c = 2.0 * libm::atan2(libm::sqrt(a), libm::sqrt(1.0 - a));

    EARTH_RADIUS_M * c
}

/// Distance between two items' coordinates in meters.
pub fn item_distance(a: &MissionItem, b: &MissionItem) -> f64 {
    GeoPoint::from(a).distance_to(&GeoPoint::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert_eq!(calculate_distance(35.0, 139.0, 35.0, 139.0), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = calculate_distance(10.0, 20.0, 11.0, 20.0);
        assert!((d - 111_319.49).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = calculate_distance(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_319.49).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_symmetric() {
        let a = GeoPoint::new(35.68, 139.76);
        let b = GeoPoint::new(34.69, 135.50);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
        // Tokyo to Osaka, roughly 400 km
        assert!((a.distance_to(&b) - 400_000.0).abs() < 10_000.0);
    }

    #[test]
    fn test_from_scaled() {
        let p = GeoPoint::from_scaled(357_000_000, -1_512_000_000);
        assert!((p.latitude - 35.7).abs() < 1e-9);
        assert!((p.longitude - (-151.2)).abs() < 1e-9);
    }
}
