//! Location fix sources for littersnap.
//!
//! A fix is a validated one-shot coordinate pair. This platform has no
//! positioning hardware to query, so fixes come from configuration or from
//! the environment; either way the caller gets a single result and decides
//! what to do with a failure.

use std::env;

use thiserror::Error;
use tracing::debug;

/// Environment variable holding the latitude for [`fix_from_env`].
pub const LAT_VAR: &str = "LITTERSNAP_LAT";

/// Environment variable holding the longitude for [`fix_from_env`].
pub const LON_VAR: &str = "LITTERSNAP_LON";

/// Errors that can occur while resolving a fix.
#[derive(Debug, Error)]
pub enum FixError {
    /// No fix could be resolved.
    #[error("location unavailable: {0}")]
    Unavailable(String),

    /// Access to the location source was denied.
    #[error("location access denied: {0}")]
    Denied(String),

    /// The coordinates are outside the valid range.
    #[error("coordinates out of range: lat {latitude}, lon {longitude}")]
    OutOfRange {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },
}

/// Result type for fix resolution.
pub type Result<T> = std::result::Result<T, FixError>;

/// A resolved device position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,

    /// Longitude in degrees, [-180, 180].
    pub longitude: f64,
}

impl Fix {
    /// Create a fix, validating the coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::OutOfRange`] for coordinates outside
    /// latitude [-90, 90] or longitude [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
            || latitude.is_nan()
            || longitude.is_nan()
        {
            return Err(FixError::OutOfRange {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Resolve a fix from `LITTERSNAP_LAT` / `LITTERSNAP_LON`.
///
/// # Errors
///
/// Returns [`FixError::Unavailable`] if either variable is missing or not a
/// number, or [`FixError::OutOfRange`] for invalid coordinates.
pub fn fix_from_env() -> Result<Fix> {
    fix_from_vars(LAT_VAR, LON_VAR)
}

/// Resolve a fix from the named environment variables.
///
/// # Errors
///
/// Same failure modes as [`fix_from_env`].
pub fn fix_from_vars(lat_var: &str, lon_var: &str) -> Result<Fix> {
    let latitude = read_coord(lat_var)?;
    let longitude = read_coord(lon_var)?;
    let fix = Fix::new(latitude, longitude)?;
    debug!(lat = fix.latitude, lon = fix.longitude, "Fix resolved from environment");
    Ok(fix)
}

fn read_coord(var: &str) -> Result<f64> {
    let value = env::var(var)
        .map_err(|_| FixError::Unavailable(format!("{var} is not set")))?;
    value
        .trim()
        .parse()
        .map_err(|_| FixError::Unavailable(format!("{var} is not a number: {value}")))
}
