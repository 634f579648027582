//! Core complaint types for littersnap.
//!
//! This module defines the fundamental data structures for representing
//! a littered-area report and its lifecycle status.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::location::Position;
use crate::photo::Photo;

/// Lifecycle stage of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The complaint has been filed and awaits attention.
    Submitted,
    /// Cleanup is underway.
    InProgress,
    /// The area has been cleaned up.
    Resolved,
}

impl Status {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Submitted, Self::InProgress, Self::Resolved];

    /// Human-readable label for display.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    /// Parse a status from its canonical form or a display label.
    ///
    /// Accepts `submitted`, `in_progress`, `In Progress`, `in-progress`, and
    /// so on; matching is case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "submitted" => Ok(Self::Submitted),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(Error::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// A single littered-area report.
///
/// Carries one or more photos, the coordinates captured at report time, an
/// optional description, and a mutable lifecycle status. Everything except
/// the status is immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    /// Unique identifier, derived from the submission timestamp.
    pub id: String,

    /// Ordered photos of the littered area. At least one is required.
    pub images: Vec<Photo>,

    /// Latitude captured at report time.
    pub latitude: f64,

    /// Longitude captured at report time.
    pub longitude: f64,

    /// Optional free-text description; empty when omitted.
    #[serde(default)]
    pub description: String,

    /// When the complaint was created.
    pub timestamp: DateTime<Utc>,

    /// Current lifecycle status.
    pub status: Status,
}

impl Complaint {
    /// Create a new complaint with the current timestamp and status
    /// Submitted.
    #[must_use]
    pub fn new(images: Vec<Photo>, position: Position, description: Option<String>) -> Self {
        let timestamp = Utc::now();
        Self {
            id: Self::id_from_timestamp(timestamp, 0),
            images,
            latitude: position.latitude,
            longitude: position.longitude,
            description: description.unwrap_or_default(),
            timestamp,
            status: Status::Submitted,
        }
    }

    /// Derive an id from a timestamp, with a bump for collision handling.
    #[must_use]
    pub fn id_from_timestamp(timestamp: DateTime<Utc>, bump: u32) -> String {
        (timestamp.timestamp_millis() + i64::from(bump)).to_string()
    }

    /// The coordinate pair of this complaint.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored coordinates are out of range.
    pub fn position(&self) -> Result<Position> {
        Ok(Position::new(self.latitude, self.longitude)?)
    }

    /// Check the persistence invariants: at least one image and a valid
    /// coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPhoto`] or a location error.
    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(Error::MissingPhoto);
        }
        self.position()?;
        Ok(())
    }

    /// Number of attached images.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}
