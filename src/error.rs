//! Error types for route construction and queries.
//!
//! Every failure mode is surfaced as a distinct [`RouteError`] variant at
//! the earliest stage that can detect it: format and value errors at
//! construction time, [`RouteError::EmptyRoute`] at query time (emptiness
//! is only known once thinning has run). Nothing is clamped or defaulted.

use std::io;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Errors produced while building a [`Route`](crate::Route) or querying
/// its aggregates.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The input is not well-formed XML, or a required structural element
    /// (`<gpx>`, `<rte>`) is absent.
    #[error("malformed GPX: {0}")]
    MalformedXml(String),

    /// A `<rtept>` element lacks a required attribute. `index` is the
    /// zero-based position of the point in document order.
    #[error("route point {index}: missing required attribute '{attribute}'")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },

    /// An attribute's text is not a valid number.
    #[error("attribute '{attribute}' has non-numeric value '{value}'")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
    },

    /// A parsed coordinate lies outside its valid range.
    #[error("{coordinate} {value} outside valid range [{min}, {max}]")]
    OutOfRange {
        coordinate: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A thinning granularity is not a positive, finite number of meters.
    #[error("granularity must be a positive number of meters, got {0}")]
    InvalidGranularity(f64),

    /// A route log file could not be read.
    #[error("failed to read route log: {0}")]
    Io(#[from] io::Error),

    /// An aggregate query was made on a route with no points.
    #[error("route contains no points")]
    EmptyRoute,
}
