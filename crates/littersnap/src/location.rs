//! Location acquisition for littersnap.
//!
//! Location is a one-shot capability: a provider either resolves a validated
//! position or reports why it couldn't. A failed resolution is surfaced to
//! the user and leaves the report without coordinates, which blocks
//! submission; nothing is retried automatically.

use littersnap_devices::location::{fix_from_env, Fix, FixError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while resolving a position.
#[derive(Debug, Error)]
pub enum LocationError {
    /// No position could be resolved.
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

impl From<FixError> for LocationError {
    fn from(err: FixError) -> Self {
        match err {
            FixError::Unavailable(msg) => Self::Unavailable(msg),
            FixError::Denied(msg) => Self::Denied(msg),
            FixError::OutOfRange {
                latitude,
                longitude,
            } => Self::OutOfRange {
                latitude,
                longitude,
            },
        }
    }
}

/// A validated coordinate pair captured at report time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,

    /// Longitude in degrees, [-180, 180].
    pub longitude: f64,
}

impl Position {
    /// Create a position, validating the coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::OutOfRange`] for invalid coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let fix = Fix::new(latitude, longitude)?;
        Ok(Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
        })
    }
}

impl From<Fix> for Position {
    fn from(fix: Fix) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
        }
    }
}

/// A one-shot source of device positions.
pub trait LocationProvider: Send + Sync {
    /// The name of this provider (for logging).
    fn name(&self) -> &'static str;

    /// Resolve the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if no position can be resolved; the caller surfaces
    /// it once and leaves the report without coordinates.
    fn current_position(&self) -> Result<Position, LocationError>;
}

/// A provider that always returns a pre-resolved position.
///
/// Used for coordinates supplied on the command line or in configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    position: Position,
}

impl FixedLocationProvider {
    /// Create a provider for the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::OutOfRange`] for invalid coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        Ok(Self {
            position: Position::new(latitude, longitude)?,
        })
    }
}

impl LocationProvider for FixedLocationProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn current_position(&self) -> Result<Position, LocationError> {
        Ok(self.position)
    }
}

/// A provider that reads `LITTERSNAP_LAT` / `LITTERSNAP_LON`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvLocationProvider;

impl EnvLocationProvider {
    /// Create the environment-backed provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LocationProvider for EnvLocationProvider {
    fn name(&self) -> &'static str {
        "env"
    }

    fn current_position(&self) -> Result<Position, LocationError> {
        let fix = fix_from_env()?;
        Ok(fix.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_valid() {
        let pos = Position::new(37.422, -122.084).unwrap();
        assert!((pos.latitude - 37.422).abs() < f64::EPSILON);
        assert!((pos.longitude + 122.084).abs() < f64::EPSILON);
    }

    #[test]
    fn test_position_out_of_range() {
        assert!(matches!(
            Position::new(91.0, 0.0),
            Err(LocationError::OutOfRange { .. })
        ));
        assert!(matches!(
            Position::new(0.0, 181.0),
            Err(LocationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_position_serde_round_trip() {
        let pos = Position::new(1.5, -2.5).unwrap();
        let json = serde_json::to_string(&pos).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(pos, back);
    }

    #[test]
    fn test_fixed_provider() {
        let provider = FixedLocationProvider::new(10.0, 20.0).unwrap();
        assert_eq!(provider.name(), "fixed");

        let pos = provider.current_position().unwrap();
        assert!((pos.latitude - 10.0).abs() < f64::EPSILON);
        assert!((pos.longitude - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fixed_provider_rejects_invalid() {
        assert!(FixedLocationProvider::new(100.0, 0.0).is_err());
    }

    #[test]
    fn test_env_provider_unavailable_without_vars() {
        std::env::remove_var(littersnap_devices::location::LAT_VAR);
        std::env::remove_var(littersnap_devices::location::LON_VAR);

        let provider = EnvLocationProvider::new();
        assert_eq!(provider.name(), "env");
        assert!(matches!(
            provider.current_position(),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[test]
    fn test_fix_error_conversion() {
        let err: LocationError = FixError::Denied("user refused".to_string()).into();
        assert!(matches!(err, LocationError::Denied(_)));
        assert!(err.to_string().contains("user refused"));
    }

    #[test]
    fn test_provider_as_trait_object() {
        let provider: Box<dyn LocationProvider> =
            Box::new(FixedLocationProvider::new(0.0, 0.0).unwrap());
        assert!(provider.current_position().is_ok());
    }
}
