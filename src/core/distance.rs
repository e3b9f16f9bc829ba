use geo::HaversineDistance;

use crate::models::{BoundingBox, Location};

/// Mean Earth radius in kilometers, as used by `geo`'s haversine
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Calculate the Haversine distance between two locations in kilometers
#[inline]
pub fn haversine_km(from: Location, to: Location) -> f64 {
    from.to_point().haversine_distance(&to.to_point()) / 1000.0
}

/// Calculate a bounding box around a center point
///
/// This is much faster than Haversine for pre-filtering. The box contains
/// every point within `radius_km` of `center`:
/// - latitude spans the angular radius on either side
/// - longitude spans `asin(sin(r / R) / cos(lat))`, the widest point of the circle
///
/// When the circle reaches a pole or would wrap the antimeridian, the
/// longitude range widens to the whole globe.
pub fn calculate_bounding_box(center: Location, radius_km: f64) -> BoundingBox {
    let angular = radius_km.max(0.0) / EARTH_RADIUS_KM;
    let lat_delta = angular.to_degrees();
    let min_lat = (center.latitude - lat_delta).max(-90.0);
    let max_lat = (center.latitude + lat_delta).min(90.0);

    let full = (-180.0, 180.0);
    let (min_lon, max_lon) = if min_lat <= -90.0 || max_lat >= 90.0 {
        full
    } else {
        let ratio = angular.sin() / center.latitude.to_radians().cos();
        if ratio >= 1.0 {
            full
        } else {
            let lon_delta = ratio.asin().to_degrees();
            if center.longitude - lon_delta < -180.0 || center.longitude + lon_delta > 180.0 {
                full
            } else {
                (center.longitude - lon_delta, center.longitude + lon_delta)
            }
        }
    };

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Check if a location is within a bounding box
#[inline]
pub fn is_within_bounding_box(location: Location, bbox: &BoundingBox) -> bool {
    location.latitude >= bbox.min_lat
        && location.latitude <= bbox.max_lat
        && location.longitude >= bbox.min_lon
        && location.longitude <= bbox.max_lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london = Location::new(-0.1278, 51.5074);
        let paris = Location::new(2.3522, 48.8566);

        let distance = haversine_km(london, paris);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let berlin = Location::new(13.4050, 52.5200);
        let munich = Location::new(11.5820, 48.1351);
        assert!((haversine_km(berlin, munich) - haversine_km(munich, berlin)).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(Location::new(-74.0060, 40.7128), 10.0);

        assert!(bbox.min_lat < 40.7128);
        assert!(bbox.max_lat > 40.7128);
        assert!(bbox.min_lon < -74.0060);
        assert!(bbox.max_lon > -74.0060);

        // Check approximate size (20km / 111km per degree = ~0.18 degrees)
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_bounding_box_wraps_antimeridian() {
        let bbox = calculate_bounding_box(Location::new(179.9, -16.5), 50.0);
        assert_eq!((bbox.min_lon, bbox.max_lon), (-180.0, 180.0));
        assert!(is_within_bounding_box(Location::new(-179.9, -16.5), &bbox));
    }

    #[test]
    fn test_bounding_box_at_pole() {
        let bbox = calculate_bounding_box(Location::new(0.0, 90.0), 25.0);
        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!((bbox.min_lon, bbox.max_lon), (-180.0, 180.0));
    }

    #[test]
    fn test_bounding_box_reaching_pole_spans_all_longitudes() {
        let bbox = calculate_bounding_box(Location::new(0.0, 89.5), 100.0);
        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!((bbox.min_lon, bbox.max_lon), (-180.0, 180.0));
    }

    #[test]
    fn test_bounding_box_contains_whole_circle() {
        use geo::HaversineDestination;

        let cases = [
            (Location::new(13.4, 52.5), 25.0),
            (Location::new(0.0, 70.0), 2000.0),
            (Location::new(-100.0, -60.0), 3000.0),
            (Location::new(45.0, 0.0), 9000.0),
        ];

        for (center, radius_km) in cases {
            let bbox = calculate_bounding_box(center, radius_km);
            for step in 0..72 {
                let bearing = f64::from(step) * 5.0;
                let edge = center
                    .to_point()
                    .haversine_destination(bearing, radius_km * 0.999 * 1000.0);
                let edge = Location::new(edge.x(), edge.y());
                assert!(
                    is_within_bounding_box(edge, &bbox),
                    "{:?} r={} bearing {} -> {:?} outside {:?}",
                    center,
                    radius_km,
                    bearing,
                    edge,
                    bbox
                );
            }
        }
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(Location::new(-74.0060, 40.7128), 10.0);

        // Center point should be within
        assert!(is_within_bounding_box(Location::new(-74.0060, 40.7128), &bbox));

        // Close point should be within
        assert!(is_within_bounding_box(Location::new(-74.0, 40.71), &bbox));

        // Far point should not be within
        assert!(!is_within_bounding_box(Location::new(-80.0, 50.0), &bbox));
    }
}
