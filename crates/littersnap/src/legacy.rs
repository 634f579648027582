//! Legacy dump import and canonical export for littersnap.
//!
//! Earlier revisions of the app persisted one storage key holding a JSON
//! array of complaints, in which two image field conventions coexist: plural
//! `images` (an array of data URLs) and singular `image` (one data URL).
//! Import accepts both, normalizes to the canonical plural form, and inserts
//! each record once; the singular variant is never written back. Export
//! produces the canonical JSON array.

use serde::Deserialize;
use tracing::{info, warn};

use crate::complaint::{Complaint, Status};
use crate::error::{Error, Result};
use crate::location::Position;
use crate::photo::Photo;
use crate::store::Repository;

/// A complaint as found in a legacy dump.
///
/// Both image field variants are accepted; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct LegacyComplaint {
    id: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    image: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    description: String,
    timestamp: String,
    #[serde(default = "default_status")]
    status: String,
}

fn default_status() -> String {
    "submitted".to_string()
}

/// Outcome of a legacy import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records inserted.
    pub imported: usize,
    /// Records skipped because their id already exists.
    pub skipped_existing: usize,
    /// Records skipped because they break the persistence invariants.
    pub skipped_invalid: usize,
}

/// Import a legacy JSON dump into the repository.
///
/// Invalid records are skipped and counted rather than aborting the whole
/// import; records whose id is already present are skipped as already
/// migrated.
///
/// # Errors
///
/// Returns an error if the dump is not a JSON array of records, or on a
/// storage failure.
pub fn import_dump(repo: &mut Repository, json: &str) -> Result<ImportSummary> {
    let records: Vec<LegacyComplaint> = serde_json::from_str(json)
        .map_err(|e| Error::legacy_import(format!("not a complaint array: {e}")))?;

    let mut summary = ImportSummary::default();
    for record in records {
        let id = record.id.clone();
        match convert(record) {
            Ok(complaint) => match repo.insert(&complaint) {
                Ok(()) => summary.imported += 1,
                Err(e) if e.is_duplicate() => {
                    warn!(id, "Already migrated, skipping");
                    summary.skipped_existing += 1;
                }
                Err(e) => return Err(e),
            },
            Err(e) => {
                warn!(id, error = %e, "Skipping invalid legacy record");
                summary.skipped_invalid += 1;
            }
        }
    }

    info!(
        imported = summary.imported,
        skipped_existing = summary.skipped_existing,
        skipped_invalid = summary.skipped_invalid,
        "Legacy import finished"
    );
    Ok(summary)
}

/// Export every complaint as the canonical JSON array.
///
/// # Errors
///
/// Returns an error on a storage or serialization failure.
pub fn export_dump(repo: &Repository) -> Result<String> {
    let complaints = repo.all()?;
    Ok(serde_json::to_string_pretty(&complaints)?)
}

/// Convert a legacy record to a canonical complaint.
fn convert(record: LegacyComplaint) -> Result<Complaint> {
    // The plural field wins; the singular variant only fills in when the
    // plural one is absent.
    let urls = if record.images.is_empty() {
        record.image.into_iter().collect()
    } else {
        record.images
    };
    if urls.is_empty() {
        return Err(Error::MissingPhoto);
    }

    let images = urls
        .iter()
        .map(|url| Photo::from_data_url(url))
        .collect::<Result<Vec<_>>>()?;

    let position = Position::new(record.latitude, record.longitude)?;

    let timestamp = chrono::DateTime::parse_from_rfc3339(&record.timestamp)
        .map_err(|e| Error::legacy_import(format!("bad timestamp {}: {e}", record.timestamp)))?
        .with_timezone(&chrono::Utc);

    let status: Status = record.status.parse()?;

    Ok(Complaint {
        id: record.id,
        images,
        latitude: position.latitude,
        longitude: position.longitude,
        description: record.description,
        timestamp,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_url(bytes: &[u8]) -> String {
        Photo::from_bytes(bytes, "image/png")
            .unwrap()
            .data_url()
            .to_string()
    }

    fn test_repo() -> Repository {
        Repository::open_in_memory().unwrap()
    }

    #[test]
    fn test_import_plural_images() {
        let mut repo = test_repo();
        let dump = format!(
            r#"[{{
                "id": "1700000000001",
                "images": ["{}", "{}"],
                "latitude": 37.422,
                "longitude": -122.084,
                "description": "two photos",
                "timestamp": "2024-01-15T10:30:00Z",
                "status": "submitted"
            }}]"#,
            data_url(b"one"),
            data_url(b"two"),
        );

        let summary = import_dump(&mut repo, &dump).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped_invalid, 0);

        let stored = repo.get("1700000000001").unwrap().unwrap();
        assert_eq!(stored.image_count(), 2);
    }

    #[test]
    fn test_import_singular_image_variant() {
        let mut repo = test_repo();
        let dump = format!(
            r#"[{{
                "id": "1700000000002",
                "image": "{}",
                "latitude": 1.0,
                "longitude": 2.0,
                "timestamp": "2024-01-15T10:30:00Z"
            }}]"#,
            data_url(b"single"),
        );

        let summary = import_dump(&mut repo, &dump).unwrap();
        assert_eq!(summary.imported, 1);

        let stored = repo.get("1700000000002").unwrap().unwrap();
        assert_eq!(stored.image_count(), 1);
        assert_eq!(stored.status, Status::Submitted);
        assert_eq!(stored.description, "");
    }

    #[test]
    fn test_import_plural_wins_over_singular() {
        let mut repo = test_repo();
        let dump = format!(
            r#"[{{
                "id": "1700000000003",
                "images": ["{}", "{}"],
                "image": "{}",
                "latitude": 1.0,
                "longitude": 2.0,
                "timestamp": "2024-01-15T10:30:00Z"
            }}]"#,
            data_url(b"plural-a"),
            data_url(b"plural-b"),
            data_url(b"singular"),
        );

        import_dump(&mut repo, &dump).unwrap();

        let stored = repo.get("1700000000003").unwrap().unwrap();
        assert_eq!(stored.image_count(), 2);
        assert_eq!(stored.images[0], Photo::from_bytes(b"plural-a", "image/png").unwrap());
    }

    #[test]
    fn test_import_accepts_status_labels() {
        let mut repo = test_repo();
        let dump = format!(
            r#"[{{
                "id": "1700000000004",
                "images": ["{}"],
                "latitude": 1.0,
                "longitude": 2.0,
                "timestamp": "2024-01-15T10:30:00Z",
                "status": "In Progress"
            }}]"#,
            data_url(b"labelled"),
        );

        import_dump(&mut repo, &dump).unwrap();

        let stored = repo.get("1700000000004").unwrap().unwrap();
        assert_eq!(stored.status, Status::InProgress);
    }

    #[test]
    fn test_import_skips_already_migrated() {
        let mut repo = test_repo();
        let dump = format!(
            r#"[{{
                "id": "1700000000005",
                "images": ["{}"],
                "latitude": 1.0,
                "longitude": 2.0,
                "timestamp": "2024-01-15T10:30:00Z"
            }}]"#,
            data_url(b"once"),
        );

        let first = import_dump(&mut repo, &dump).unwrap();
        assert_eq!(first.imported, 1);

        let second = import_dump(&mut repo, &dump).unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped_existing, 1);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_import_skips_invalid_records() {
        let mut repo = test_repo();
        let dump = format!(
            r#"[
                {{
                    "id": "no-images",
                    "latitude": 1.0,
                    "longitude": 2.0,
                    "timestamp": "2024-01-15T10:30:00Z"
                }},
                {{
                    "id": "bad-coords",
                    "images": ["{}"],
                    "latitude": 95.0,
                    "longitude": 2.0,
                    "timestamp": "2024-01-15T10:30:00Z"
                }},
                {{
                    "id": "good",
                    "images": ["{}"],
                    "latitude": 1.0,
                    "longitude": 2.0,
                    "timestamp": "2024-01-15T10:30:00Z"
                }}
            ]"#,
            data_url(b"oob"),
            data_url(b"fine"),
        );

        let summary = import_dump(&mut repo, &dump).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped_invalid, 2);
        assert!(repo.get("good").unwrap().is_some());
        assert!(repo.get("no-images").unwrap().is_none());
    }

    #[test]
    fn test_import_rejects_non_array() {
        let mut repo = test_repo();
        let result = import_dump(&mut repo, "{\"not\": \"an array\"}");
        assert!(matches!(result, Err(Error::LegacyImport { .. })));
    }

    #[test]
    fn test_import_bad_timestamp_skipped() {
        let mut repo = test_repo();
        let dump = format!(
            r#"[{{
                "id": "bad-time",
                "images": ["{}"],
                "latitude": 1.0,
                "longitude": 2.0,
                "timestamp": "last tuesday"
            }}]"#,
            data_url(b"when"),
        );

        let summary = import_dump(&mut repo, &dump).unwrap();
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped_invalid, 1);
    }

    #[test]
    fn test_export_is_canonical() {
        let mut repo = test_repo();
        let dump = format!(
            r#"[{{
                "id": "1700000000006",
                "image": "{}",
                "latitude": 37.422,
                "longitude": -122.084,
                "description": "was singular",
                "timestamp": "2024-01-15T10:30:00Z"
            }}]"#,
            data_url(b"canonical"),
        );
        import_dump(&mut repo, &dump).unwrap();

        let exported = export_dump(&repo).unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
        let record = &value.as_array().unwrap()[0];

        // Canonical plural form only; the singular field is gone.
        assert!(record.get("images").is_some());
        assert!(record.get("image").is_none());
        assert_eq!(record.get("status").unwrap(), "submitted");
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut repo = test_repo();
        let dump = format!(
            r#"[{{
                "id": "1700000000007",
                "images": ["{}"],
                "latitude": 5.5,
                "longitude": 6.5,
                "description": "round trip",
                "timestamp": "2024-01-15T10:30:00Z",
                "status": "resolved"
            }}]"#,
            data_url(b"round"),
        );
        import_dump(&mut repo, &dump).unwrap();

        let exported = export_dump(&repo).unwrap();

        let mut second = test_repo();
        let summary = import_dump(&mut second, &exported).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(
            second.get("1700000000007").unwrap().unwrap(),
            repo.get("1700000000007").unwrap().unwrap()
        );
    }

    #[test]
    fn test_import_summary_default() {
        let summary = ImportSummary::default();
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped_existing, 0);
        assert_eq!(summary.skipped_invalid, 0);
    }
}
