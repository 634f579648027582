//! Configuration management for littersnap.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use littersnap_devices::spool::SpoolCameraConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::location::Position;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "littersnap";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "complaints.db";

/// Default spool directory name.
const SPOOL_DIR_NAME: &str = "spool";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LITTERSNAP_`)
/// 2. TOML config file at `~/.config/littersnap/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Camera configuration.
    pub camera: CameraConfig,
    /// Location configuration.
    pub location: LocationConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/littersnap/complaints.db`
    pub database_path: Option<PathBuf>,
}

/// Camera-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Directory the camera device writes frames into.
    /// Defaults to `~/.local/share/littersnap/spool`
    pub spool_dir: Option<PathBuf>,
    /// Interval between spool checks in milliseconds.
    pub poll_interval_ms: u64,
    /// Whether the camera device has a torch.
    pub torch_available: bool,
    /// Minimum photo payload size to accept.
    pub min_photo_bytes: usize,
    /// Maximum photo payload size to accept.
    pub max_photo_bytes: usize,
    /// Maximum number of photos per report.
    pub max_photos: usize,
}

/// Location-related configuration.
///
/// When both coordinates are set, reports default to this position; the
/// environment variables and command-line flags still override it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Default latitude for reports.
    pub latitude: Option<f64>,
    /// Default longitude for reports.
    pub longitude: Option<f64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            spool_dir: None, // Will be resolved to default at runtime
            poll_interval_ms: 500,
            torch_available: false,
            min_photo_bytes: 1,
            max_photo_bytes: 10 * 1024 * 1024, // 10MB max
            max_photos: 8,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `LITTERSNAP_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("LITTERSNAP_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.camera.poll_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "poll_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.camera.min_photo_bytes > self.camera.max_photo_bytes {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_photo_bytes ({}) cannot be greater than max_photo_bytes ({})",
                    self.camera.min_photo_bytes, self.camera.max_photo_bytes
                ),
            });
        }

        if self.camera.max_photos == 0 {
            return Err(Error::ConfigValidation {
                message: "max_photos must be at least 1".to_string(),
            });
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                Position::new(lat, lon).map_err(|e| Error::ConfigValidation {
                    message: format!("invalid default location: {e}"),
                })?;
            }
            (None, None) => {}
            _ => {
                return Err(Error::ConfigValidation {
                    message: "location requires both latitude and longitude, or neither"
                        .to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the spool directory, resolving defaults if not set.
    #[must_use]
    pub fn spool_dir(&self) -> PathBuf {
        self.camera
            .spool_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(SPOOL_DIR_NAME))
    }

    /// Get the poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.camera.poll_interval_ms)
    }

    /// The default position from configuration, if one is set.
    #[must_use]
    pub fn default_position(&self) -> Option<Position> {
        match (self.location.latitude, self.location.longitude) {
            // validate() has checked the ranges already
            (Some(lat), Some(lon)) => Position::new(lat, lon).ok(),
            _ => None,
        }
    }

    /// Build the spool camera configuration for the device crate.
    #[must_use]
    pub fn spool_camera_config(&self) -> SpoolCameraConfig {
        SpoolCameraConfig {
            spool_dir: self.spool_dir(),
            poll_interval: self.poll_interval(),
            torch_available: self.camera.torch_available,
            min_frame_bytes: self.camera.min_photo_bytes,
            max_frame_bytes: self.camera.max_photo_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.camera.spool_dir.is_none());
        assert!(!config.camera.torch_available);
        assert!(config.location.latitude.is_none());
    }

    #[test]
    fn test_default_camera_config() {
        let camera = CameraConfig::default();

        assert_eq!(camera.poll_interval_ms, 500);
        assert_eq!(camera.min_photo_bytes, 1);
        assert_eq!(camera.max_photo_bytes, 10 * 1024 * 1024);
        assert_eq!(camera.max_photos, 8);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_poll_interval() {
        let mut config = Config::default();
        config.camera.poll_interval_ms = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_validate_invalid_photo_bounds() {
        let mut config = Config::default();
        config.camera.min_photo_bytes = 1000;
        config.camera.max_photo_bytes = 100;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("min_photo_bytes"));
    }

    #[test]
    fn test_validate_zero_max_photos() {
        let mut config = Config::default();
        config.camera.max_photos = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_photos"));
    }

    #[test]
    fn test_validate_half_location() {
        let mut config = Config::default();
        config.location.latitude = Some(37.422);

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("both latitude and longitude"));
    }

    #[test]
    fn test_validate_out_of_range_location() {
        let mut config = Config::default();
        config.location.latitude = Some(95.0);
        config.location.longitude = Some(0.0);

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid default location"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains("complaints.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_spool_dir_default() {
        let config = Config::default();
        assert!(config.spool_dir().to_string_lossy().contains("spool"));
    }

    #[test]
    fn test_poll_interval() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_default_position_unset() {
        let config = Config::default();
        assert!(config.default_position().is_none());
    }

    #[test]
    fn test_default_position_set() {
        let mut config = Config::default();
        config.location.latitude = Some(37.422);
        config.location.longitude = Some(-122.084);

        let position = config.default_position().unwrap();
        assert!((position.latitude - 37.422).abs() < f64::EPSILON);
    }

    #[test]
    fn test_spool_camera_config_bridge() {
        let mut config = Config::default();
        config.camera.torch_available = true;
        config.camera.poll_interval_ms = 250;

        let spool = config.spool_camera_config();
        assert!(spool.torch_available);
        assert_eq!(spool.poll_interval, Duration::from_millis(250));
        assert_eq!(spool.max_frame_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("littersnap"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("littersnap"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("database_path"));
        assert!(json.contains("max_photos"));
        assert!(json.contains("latitude"));
    }

    #[test]
    fn test_camera_config_deserialize() {
        let json = r#"{"poll_interval_ms": 250, "torch_available": true}"#;
        let camera: CameraConfig = serde_json::from_str(json).unwrap();
        assert_eq!(camera.poll_interval_ms, 250);
        assert!(camera.torch_available);
        // Unset fields keep their defaults.
        assert_eq!(camera.max_photos, 8);
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
