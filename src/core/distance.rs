/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in degrees.
///
/// Symmetric in its endpoints and well behaved across the antimeridian.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Human-readable distance badge
///
/// A known distance always renders, zero included ("0.0 km"). Only an
/// unknown distance yields `None`.
pub fn format_distance(distance_km: Option<f64>) -> Option<String> {
    distance_km
        .filter(|d| d.is_finite())
        .map(|d| format!("{:.1} km", d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amsterdam_to_utrecht() {
        // Dam square to Utrecht Dom tower, roughly 35 km as the crow flies
        let distance = haversine_distance(52.3731, 4.8926, 52.0907, 5.1214);
        assert!(distance > 33.0 && distance < 37.0, "got {}", distance);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let distance = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((distance - 111.19).abs() < 0.01, "got {}", distance);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(Some(0.0)), Some("0.0 km".to_string()));
        assert_eq!(format_distance(Some(3.456)), Some("3.5 km".to_string()));
        assert_eq!(format_distance(None), None);
        assert_eq!(format_distance(Some(f64::NAN)), None);
    }
}
