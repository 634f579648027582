//! Storage layer for littersnap.
//!
//! This module provides `SQLite`-based persistent storage for complaints:
//! an explicit repository with create/read/update/delete operations over the
//! complaint record type, replacing the rewrite-the-whole-list storage the
//! original design grew out of.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::complaint::{Complaint, Status};
use crate::error::{Error, Result};
use crate::photo::Photo;

/// Repository for complaint records.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Complaint insertion with id-collision detection
/// - Listing, newest first, with optional status filtering
/// - Status reassignment and deletion per record
/// - Aggregate counts per status for the dashboard
#[derive(Debug)]
pub struct Repository {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Repository {
    /// Open or create a repository database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        Self::apply_pragmas(&conn)?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        Self::apply_pragmas(&conn)?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// WAL for read friendliness; foreign keys for the image cascade.
    fn apply_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;
        Ok(())
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a complaint with its images.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateComplaint`] if the id is taken, a
    /// validation error if the record breaks the persistence invariants, or
    /// a database error.
    pub fn insert(&mut self, complaint: &Complaint) -> Result<()> {
        complaint.validate()?;

        if self.exists(&complaint.id)? {
            return Err(Error::DuplicateComplaint {
                id: complaint.id.clone(),
            });
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            r"
            INSERT INTO complaints (id, timestamp, latitude, longitude, description, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                complaint.id,
                complaint.timestamp.to_rfc3339(),
                complaint.latitude,
                complaint.longitude,
                complaint.description,
                complaint.status.to_string(),
            ],
        )?;

        for (position, photo) in complaint.images.iter().enumerate() {
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            tx.execute(
                r"
                INSERT INTO complaint_images (complaint_id, position, data_url, content_hash)
                VALUES (?1, ?2, ?3, ?4)
                ",
                params![complaint.id, position, photo.data_url(), photo.content_hash()],
            )?;
        }
        tx.commit()?;

        debug!(id = %complaint.id, images = complaint.image_count(), "Inserted complaint");
        Ok(())
    }

    /// Check if a complaint with the given id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn exists(&self, id: &str) -> Result<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM complaints WHERE id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get a complaint by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: &str) -> Result<Option<Complaint>> {
        let row = self
            .conn
            .query_row(
                r"
                SELECT id, timestamp, latitude, longitude, description, status
                FROM complaints WHERE id = ?1
                ",
                [id],
                Self::row_to_record,
            )
            .optional()?;

        match row {
            Some(record) => {
                let images = self.images_for(&record.id)?;
                Ok(Some(record.into_complaint(images)))
            }
            None => Ok(None),
        }
    }

    /// List complaints, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self, limit: usize) -> Result<Vec<Complaint>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, latitude, longitude, description, status
            FROM complaints ORDER BY timestamp DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map([limit_i64], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.attach_images(records)
    }

    /// List complaints with the given status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_by_status(&self, status: Status, limit: usize) -> Result<Vec<Complaint>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, latitude, longitude, description, status
            FROM complaints WHERE status = ?1
            ORDER BY timestamp DESC LIMIT ?2
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![status.to_string(), limit_i64], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.attach_images(records)
    }

    /// All complaints, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn all(&self) -> Result<Vec<Complaint>> {
        self.list(usize::MAX)
    }

    /// Reassign the status of a complaint.
    ///
    /// Returns `true` if a complaint was updated, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_status(&mut self, id: &str, status: Status) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE complaints SET status = ?1 WHERE id = ?2",
            params![status.to_string(), id],
        )?;
        if affected > 0 {
            debug!(id, status = %status, "Status updated");
        }
        Ok(affected > 0)
    }

    /// Delete a complaint and its images.
    ///
    /// Returns `true` if a complaint was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM complaints WHERE id = ?1", [id])?;
        if affected > 0 {
            debug!(id, "Complaint deleted");
        }
        Ok(affected > 0)
    }

    /// Count total complaints in the repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM complaints", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Aggregate counts per status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn status_counts(&self) -> Result<StatusCounts> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM complaints GROUP BY status")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut counts = StatusCounts::default();
        for (status_str, count) in rows {
            match status_str.parse::<Status>() {
                Ok(Status::Submitted) => counts.submitted += count,
                Ok(Status::InProgress) => counts.in_progress += count,
                Ok(Status::Resolved) => counts.resolved += count,
                Err(_) => {
                    warn!(status = %status_str, "Unknown status in storage, counting as submitted");
                    counts.submitted += count;
                }
            }
        }
        Ok(counts)
    }

    /// Load the images for each record, preserving record order.
    fn attach_images(&self, records: Vec<ComplaintRecord>) -> Result<Vec<Complaint>> {
        records
            .into_iter()
            .map(|record| {
                let images = self.images_for(&record.id)?;
                Ok(record.into_complaint(images))
            })
            .collect()
    }

    /// Load the ordered images of a complaint.
    fn images_for(&self, id: &str) -> Result<Vec<Photo>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT data_url, content_hash FROM complaint_images
            WHERE complaint_id = ?1 ORDER BY position ASC
            ",
        )?;
        let rows = stmt
            .query_map([id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut images = Vec::with_capacity(rows.len());
        for (data_url, stored_hash) in rows {
            match Photo::from_data_url(&data_url) {
                Ok(photo) => {
                    if photo.content_hash() != stored_hash {
                        warn!(complaint = id, "Image hash mismatch, payload may be corrupted");
                    }
                    images.push(photo);
                }
                Err(e) => {
                    warn!(complaint = id, error = %e, "Skipping unreadable image payload");
                }
            }
        }
        Ok(images)
    }

    /// Convert a database row to an intermediate complaint record.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ComplaintRecord> {
        let id: String = row.get(0)?;
        let timestamp_str: String = row.get(1)?;
        let latitude: f64 = row.get(2)?;
        let longitude: f64 = row.get(3)?;
        let description: String = row.get(4)?;
        let status_str: String = row.get(5)?;

        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        let status = status_str.parse::<Status>().unwrap_or_else(|_| {
            warn!(status = %status_str, "Unknown status, defaulting to submitted");
            Status::Submitted
        });

        Ok(ComplaintRecord {
            id,
            timestamp,
            latitude,
            longitude,
            description,
            status,
        })
    }
}

/// A complaint row before its images are attached.
struct ComplaintRecord {
    id: String,
    timestamp: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    description: String,
    status: Status,
}

impl ComplaintRecord {
    fn into_complaint(self, images: Vec<Photo>) -> Complaint {
        Complaint {
            id: self.id,
            images,
            latitude: self.latitude,
            longitude: self.longitude,
            description: self.description,
            timestamp: self.timestamp,
            status: self.status,
        }
    }
}

/// Aggregate complaint counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Complaints awaiting attention.
    pub submitted: i64,
    /// Complaints with cleanup underway.
    pub in_progress: i64,
    /// Complaints resolved.
    pub resolved: i64,
}

impl StatusCounts {
    /// Total number of complaints.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.submitted + self.in_progress + self.resolved
    }

    /// The count for a given status.
    #[must_use]
    pub fn for_status(&self, status: Status) -> i64 {
        match status {
            Status::Submitted => self.submitted,
            Status::InProgress => self.in_progress,
            Status::Resolved => self.resolved,
        }
    }
}
