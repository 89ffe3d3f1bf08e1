//! # Route Metrics
//!
//! GPX route ingestion and aggregate metrics for GPS analysis tools.
//!
//! This library provides:
//! - Parsing of a GPX route dialect (`<gpx><rte>` with `<rtept>` points)
//!   with strict coordinate validation
//! - Granularity-driven grid thinning to de-noise variable-density tracks
//! - Aggregate queries over the resulting route (extrema, total distance,
//!   bounds, center)
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch construction with rayon
//! - **`serde`** - Serde derives on the core value types
//!
//! ## Quick Start
//!
//! ```rust
//! use route_metrics::{Granularity, Route};
//!
//! let gpx = r#"<gpx><rte><name>MyRoute</name>
//!     <rtept lat="52.91" lon="-1.18"/>
//!     <rtept lat="52.92" lon="-1.19" ele="35"/>
//! </rte></gpx>"#;
//!
//! let route = Route::from_gpx_str(gpx, Granularity::Off)?;
//! assert_eq!(route.name(), "MyRoute");
//! assert_eq!(route.max_latitude()?, 52.92);
//! assert_eq!(route.max_elevation()?, 35.0);
//! # Ok::<(), route_metrics::RouteError>(())
//! ```
//!
//! A route is immutable once constructed: parsing and thinning happen in
//! the constructor, and every query afterwards is a pure read. Routes can
//! be shared across threads for concurrent queries without locking.

use std::path::Path;

use log::warn;

pub mod error;
pub mod geo_utils;
mod gpx;
mod grid;
pub mod logs;

pub use error::{Result, RouteError};

use crate::geo_utils::{compute_center, polyline_length};

// ============================================================================
// Core Types
// ============================================================================

/// Largest legal latitude in degrees; the legal range is symmetric.
pub const MAX_LATITUDE_DEGREES: f64 = 90.0;

/// Largest legal longitude in degrees; the legal range is symmetric.
pub const MAX_LONGITUDE_DEGREES: f64 = 180.0;

/// A validated GPS coordinate with latitude, longitude, and elevation.
///
/// Construction checks each coordinate against its legal range, so a
/// `GpsPoint` held by any API in this crate is always in range.
///
/// # Example
/// ```
/// use route_metrics::GpsPoint;
/// let point = GpsPoint::try_new(51.5074, -0.1278, 12.0).unwrap(); // London
/// assert_eq!(point.latitude(), 51.5074);
///
/// assert!(GpsPoint::try_new(91.0, 0.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GpsPoint {
    latitude: f64,
    longitude: f64,
    elevation: f64,
}

impl GpsPoint {
    /// Create a point from numeric coordinates.
    ///
    /// Latitude outside [−90, 90], longitude outside [−180, 180], or any
    /// non-finite value fails with [`RouteError::OutOfRange`].
    pub fn try_new(latitude: f64, longitude: f64, elevation: f64) -> Result<Self> {
        check_range(latitude, "latitude", MAX_LATITUDE_DEGREES)?;
        check_range(longitude, "longitude", MAX_LONGITUDE_DEGREES)?;
        if !elevation.is_finite() {
            return Err(RouteError::OutOfRange {
                coordinate: "elevation",
                value: elevation,
                min: f64::NEG_INFINITY,
                max: f64::INFINITY,
            });
        }
        Ok(Self {
            latitude,
            longitude,
            elevation,
        })
    }

    /// Create a point from textual attribute values.
    ///
    /// Each field is parsed independently; text that is not a valid
    /// number fails with [`RouteError::InvalidNumber`]. Absent elevation
    /// defaults to 0.
    pub fn from_text(lat: &str, lon: &str, ele: Option<&str>) -> Result<Self> {
        let latitude = parse_coordinate(lat, "lat")?;
        let longitude = parse_coordinate(lon, "lon")?;
        let elevation = match ele {
            Some(text) => parse_coordinate(text, "ele")?,
            None => 0.0,
        };
        Self::try_new(latitude, longitude, elevation)
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Elevation in meters above the reference datum.
    pub fn elevation(&self) -> f64 {
        self.elevation
    }
}

/// Bounding box for a route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points. Returns `None` for an empty slice.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds, at elevation 0.
    pub fn center(&self) -> GpsPoint {
        GpsPoint {
            latitude: (self.min_lat + self.max_lat) / 2.0,
            longitude: (self.min_lng + self.max_lng) / 2.0,
            elevation: 0.0,
        }
    }
}

/// Spatial thinning configuration for route construction.
///
/// An explicit two-state configuration rather than a zero/negative
/// sentinel, so an accidental zero can never silently disable thinning:
/// `Meters(g)` with a non-positive or non-finite `g` is rejected with
/// [`RouteError::InvalidGranularity`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Granularity {
    /// Keep every parsed route point.
    Off,
    /// Collapse points sharing a grid cell of this size in meters,
    /// keeping the earliest point per cell.
    Meters(f64),
}

impl Granularity {
    /// Reject a non-positive or non-finite cell size.
    pub fn validate(self) -> Result<()> {
        match self {
            Granularity::Off => Ok(()),
            Granularity::Meters(m) if m.is_finite() && m > 0.0 => Ok(()),
            Granularity::Meters(m) => Err(RouteError::InvalidGranularity(m)),
        }
    }
}

// ============================================================================
// Route
// ============================================================================

/// A named, ordered sequence of GPS points with aggregate queries.
///
/// Built once from a GPX source and a [`Granularity`], immutable
/// afterwards. Point order is the document order of the `<rtept>`
/// elements; it defines adjacency for distance computation and the
/// first-seen-wins rule during thinning.
///
/// # Example
/// ```
/// use route_metrics::{Granularity, Route};
///
/// let gpx = r#"<gpx><rte><name>MyRoute</name><rtept lat="-1.00000" lon="0"></rtept></rte></gpx>"#;
/// let route = Route::from_gpx_str(gpx, Granularity::Off).unwrap();
/// assert_eq!(route.max_latitude().unwrap(), -1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    points: Vec<GpsPoint>,
}

impl Route {
    /// Build a route from GPX text.
    pub fn from_gpx_str(xml: &str, granularity: Granularity) -> Result<Self> {
        granularity.validate()?;
        let raw = gpx::parse_route(xml)?;
        Ok(Self::freeze(raw.name, raw.points, granularity))
    }

    /// Build a route from a GPX file.
    ///
    /// The whole file is read up front; an unreadable path fails with
    /// [`RouteError::Io`]. See [`logs::RouteLogs`](crate::logs::RouteLogs)
    /// for resolving named logs against a configured routes directory.
    pub fn from_gpx_file<P: AsRef<Path>>(path: P, granularity: Granularity) -> Result<Self> {
        granularity.validate()?;
        let xml = std::fs::read_to_string(path)?;
        Self::from_gpx_str(&xml, granularity)
    }

    /// Build a route from already-validated points.
    ///
    /// The same thinning rules apply as for the GPX constructors; the
    /// name is trimmed of surrounding blank space.
    pub fn from_points(name: &str, points: Vec<GpsPoint>, granularity: Granularity) -> Result<Self> {
        granularity.validate()?;
        Ok(Self::freeze(name.trim().to_string(), points, granularity))
    }

    /// Apply thinning and freeze the route. Granularity is validated by
    /// the callers.
    fn freeze(name: String, points: Vec<GpsPoint>, granularity: Granularity) -> Self {
        let points = match granularity {
            Granularity::Off => points,
            Granularity::Meters(cell) => grid::thin_points(points, cell),
        };
        if points.is_empty() {
            warn!("route '{name}' contains no points");
        }
        Self { name, points }
    }

    /// The route name, trimmed of surrounding blank space. Empty when the
    /// source had no `<name>` or only blank content.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored point sequence, after any thinning.
    pub fn points(&self) -> &[GpsPoint] {
        &self.points
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the route has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    // ------------------------------------------------------------------
    // Aggregate queries. Each is a single O(n) scan over the immutable
    // sequence and fails with EmptyRoute on a zero-point route instead of
    // returning a sentinel.
    // ------------------------------------------------------------------

    /// Maximum latitude reached by the route, in degrees.
    pub fn max_latitude(&self) -> Result<f64> {
        self.reduce(|p| p.latitude, f64::max)
    }

    /// Minimum latitude reached by the route, in degrees.
    pub fn min_latitude(&self) -> Result<f64> {
        self.reduce(|p| p.latitude, f64::min)
    }

    /// Maximum longitude reached by the route, in degrees.
    pub fn max_longitude(&self) -> Result<f64> {
        self.reduce(|p| p.longitude, f64::max)
    }

    /// Minimum longitude reached by the route, in degrees.
    pub fn min_longitude(&self) -> Result<f64> {
        self.reduce(|p| p.longitude, f64::min)
    }

    /// Maximum elevation reached by the route, in meters.
    pub fn max_elevation(&self) -> Result<f64> {
        self.reduce(|p| p.elevation, f64::max)
    }

    /// Minimum elevation reached by the route, in meters.
    pub fn min_elevation(&self) -> Result<f64> {
        self.reduce(|p| p.elevation, f64::min)
    }

    /// Total path length in meters: the haversine distance summed over
    /// consecutive points. A single-point route has length 0.
    pub fn total_distance(&self) -> Result<f64> {
        if self.points.is_empty() {
            return Err(RouteError::EmptyRoute);
        }
        Ok(polyline_length(&self.points))
    }

    /// Bounding box of the stored points.
    pub fn bounds(&self) -> Result<Bounds> {
        Bounds::from_points(&self.points).ok_or(RouteError::EmptyRoute)
    }

    /// Mean position of the stored points.
    pub fn center(&self) -> Result<GpsPoint> {
        compute_center(&self.points).ok_or(RouteError::EmptyRoute)
    }

    /// Single-pass reduction over one coordinate axis.
    fn reduce(
        &self,
        value: impl Fn(&GpsPoint) -> f64,
        pick: impl Fn(f64, f64) -> f64,
    ) -> Result<f64> {
        let mut values = self.points.iter().map(value);
        let first = values.next().ok_or(RouteError::EmptyRoute)?;
        Ok(values.fold(first, pick))
    }
}

// ============================================================================
// Batch Construction
// ============================================================================

/// Build routes from many GPX files in parallel.
///
/// Each construction is independent with no shared mutable state, so the
/// batch parallelizes cleanly; per-file failures are reported in place.
#[cfg(feature = "parallel")]
pub fn routes_from_files_parallel<P>(paths: &[P], granularity: Granularity) -> Vec<Result<Route>>
where
    P: AsRef<Path> + Sync,
{
    use rayon::prelude::*;

    paths
        .par_iter()
        .map(|path| Route::from_gpx_file(path, granularity))
        .collect()
}

// ============================================================================
// Helper Functions
// ============================================================================

fn check_range(value: f64, coordinate: &'static str, bound: f64) -> Result<()> {
    if !value.is_finite() || value < -bound || value > bound {
        return Err(RouteError::OutOfRange {
            coordinate,
            value,
            min: -bound,
            max: bound,
        });
    }
    Ok(())
}

fn parse_coordinate(text: &str, attribute: &'static str) -> Result<f64> {
    let value: f64 = text.trim().parse().map_err(|_| RouteError::InvalidNumber {
        attribute,
        value: text.to_string(),
    })?;
    if !value.is_finite() {
        return Err(RouteError::InvalidNumber {
            attribute,
            value: text.to_string(),
        });
    }
    Ok(value)
}

// ============================================================================
// Tests
// ============================================================================
