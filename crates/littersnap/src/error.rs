//! Error types for littersnap.
//!
//! This module defines all error types used throughout the littersnap crate,
//! providing detailed context for debugging and user-facing notices.

use std::path::PathBuf;
use thiserror::Error;

use crate::camera::CameraError;
use crate::location::LocationError;

/// The main error type for littersnap operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A complaint with this id already exists.
    #[error("a complaint with id {id} already exists")]
    DuplicateComplaint {
        /// The colliding id.
        id: String,
    },

    /// No complaint with this id exists.
    #[error("no complaint with id {id}")]
    ComplaintNotFound {
        /// The missing id.
        id: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Submission Notices ===
    /// A report was submitted without any photo.
    #[error("missing photo: attach at least one photo before submitting")]
    MissingPhoto,

    /// A report was submitted without a resolved location.
    #[error("missing location: no position could be resolved for this report")]
    MissingLocation,

    // === Capability Errors ===
    /// A camera operation failed.
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),

    /// A location operation failed.
    #[error("location error: {0}")]
    Location(#[from] LocationError),

    // === Photo Errors ===
    /// Failed to read a photo file.
    #[error("failed to read photo {path}: {source}")]
    PhotoRead {
        /// Path to the photo file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A photo payload could not be decoded.
    #[error("invalid photo payload: {message}")]
    PhotoDecode {
        /// Description of what went wrong.
        message: String,
    },

    /// A photo payload is outside the accepted size bounds.
    #[error("photo of {bytes} bytes is outside the accepted range [{min}, {max}]")]
    PhotoSize {
        /// Size of the rejected payload.
        bytes: usize,
        /// Minimum accepted size.
        min: usize,
        /// Maximum accepted size.
        max: usize,
    },

    /// The photo tray is full.
    #[error("the photo tray already holds {max} photos")]
    TrayFull {
        /// Maximum number of photos per report.
        max: usize,
    },

    // === Model Errors ===
    /// An unknown status value was encountered.
    #[error("unknown status: {value}")]
    UnknownStatus {
        /// The rejected value.
        value: String,
    },

    // === Legacy Interchange Errors ===
    /// A legacy dump could not be imported.
    #[error("legacy import failed: {message}")]
    LegacyImport {
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for littersnap operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a photo decode error.
    #[must_use]
    pub fn photo_decode(message: impl Into<String>) -> Self {
        Self::PhotoDecode {
            message: message.into(),
        }
    }

    /// Create a legacy import error.
    #[must_use]
    pub fn legacy_import(message: impl Into<String>) -> Self {
        Self::LegacyImport {
            message: message.into(),
        }
    }

    /// Check if this error is a notice the user can act on by retrying the
    /// failed action, as opposed to an internal failure.
    #[must_use]
    pub fn is_user_notice(&self) -> bool {
        matches!(
            self,
            Self::MissingPhoto
                | Self::MissingLocation
                | Self::TrayFull { .. }
                | Self::PhotoSize { .. }
                | Self::Camera(_)
                | Self::Location(_)
        )
    }

    /// Check if this error indicates an id collision.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateComplaint { .. })
    }
}
