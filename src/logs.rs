//! Reading stored GPX route logs.
//!
//! Analysis tools keep recorded routes as GPX files under a routes
//! directory; [`RouteLogs`] resolves log names against that directory and
//! reads whole files into memory before any parsing happens. An
//! unreadable log surfaces as [`RouteError::Io`](crate::RouteError::Io).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::{Granularity, Route};

/// Default directory for stored GPX route logs, relative to the working
/// directory.
pub const DEFAULT_ROUTES_DIR: &str = "logs/gpx/routes";

/// A configured routes directory.
///
/// # Example
///
/// ```rust,no_run
/// use route_metrics::logs::RouteLogs;
/// use route_metrics::Granularity;
///
/// let logs = RouteLogs::default();
/// let route = logs.route("commute.gpx", Granularity::Off)?;
/// println!("{}: {} points", route.name(), route.len());
/// # Ok::<(), route_metrics::RouteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RouteLogs {
    root: PathBuf,
}

impl Default for RouteLogs {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTES_DIR)
    }
}

impl RouteLogs {
    /// Use `root` as the routes directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured routes directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a named log inside the routes directory.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Read a named log to a string.
    pub fn read(&self, file_name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path(file_name))?)
    }

    /// Build a [`Route`] from a named log.
    pub fn route(&self, file_name: &str, granularity: Granularity) -> Result<Route> {
        Route::from_gpx_str(&self.read(file_name)?, granularity)
    }
}
