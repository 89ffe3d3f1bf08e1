//! # Geographic Utilities
//!
//! Core geographic computation utilities for route analysis.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two points in meters |
//! | [`polyline_length`] | Total length of a point sequence in meters |
//! | [`compute_center`] | Mean position of a point sequence |
//! | [`meters_to_degrees`] | Convert meters to approximate degrees at a latitude |
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees),
//! the standard used by GPS receivers.

use geo::{Distance, Haversine, Point};

use crate::GpsPoint;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Calculate the great-circle distance between two points using the
/// Haversine formula.
///
/// Returns the distance in meters along the Earth's surface, accurate to
/// within about 0.3% for GPS-scale work.
///
/// # Example
///
/// ```rust
/// use route_metrics::{geo_utils, GpsPoint};
///
/// let london = GpsPoint::try_new(51.5074, -0.1278, 0.0).unwrap();
/// let paris = GpsPoint::try_new(48.8566, 2.3522, 0.0).unwrap();
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude(), p1.latitude());
    let point2 = Point::new(p2.longitude(), p2.latitude());
    Haversine::distance(point1, point2)
}

/// Calculate the total length of a point sequence in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point sequences return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Compute the mean position of a point sequence.
///
/// Arithmetic mean of latitude, longitude, and elevation; suitable for
/// routes of ordinary geographic extent. Returns `None` for an empty
/// slice. Sequences spanning the antimeridian may average to an
/// unexpected longitude.
pub fn compute_center(points: &[GpsPoint]) -> Option<GpsPoint> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let lat = points.iter().map(|p| p.latitude()).sum::<f64>() / n;
    let lng = points.iter().map(|p| p.longitude()).sum::<f64>() / n;
    let ele = points.iter().map(|p| p.elevation()).sum::<f64>() / n;

    // Means of in-range coordinates stay in range.
    GpsPoint::try_new(lat, lng, ele).ok()
}

/// Convert meters to approximate degrees at a given latitude.
///
/// At the equator, 1 degree is about 111,320 meters; the longitude scale
/// shrinks with cos(latitude). The cosine is floored to keep the result
/// finite near the poles.
#[inline]
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_rad = latitude.to_radians();
    let meters_per_degree = METERS_PER_DEGREE * lat_rad.cos().max(0.1);
    meters / meters_per_degree
}
