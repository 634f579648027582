//! `SQLite` schema definitions for littersnap.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the complaints table.
pub const CREATE_COMPLAINTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS complaints (
    id TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'submitted',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the complaint images table.
///
/// Images are ordered by `position` within a complaint and are removed with
/// their complaint via the cascade.
pub const CREATE_COMPLAINT_IMAGES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS complaint_images (
    complaint_id TEXT NOT NULL REFERENCES complaints(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    data_url TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    PRIMARY KEY (complaint_id, position)
)
";

/// SQL statement to create an index on timestamp for newest-first listings.
pub const CREATE_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_complaints_timestamp ON complaints(timestamp DESC)
";

/// SQL statement to create an index on status for dashboard counts.
pub const CREATE_STATUS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_complaints_status ON complaints(status)
";

/// SQL statement to create an index on image hashes.
pub const CREATE_IMAGE_HASH_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_complaint_images_hash ON complaint_images(content_hash)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_COMPLAINTS_TABLE,
    CREATE_COMPLAINT_IMAGES_TABLE,
    CREATE_TIMESTAMP_INDEX,
    CREATE_STATUS_INDEX,
    CREATE_IMAGE_HASH_INDEX,
    CREATE_METADATA_TABLE,
];
