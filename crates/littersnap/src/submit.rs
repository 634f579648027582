//! Report submission for littersnap.
//!
//! Submission validates that the tray holds at least one photo and that a
//! position was resolved, then appends exactly one new complaint to the
//! repository. Id collisions (two submissions in the same millisecond) are
//! handled by bumping the timestamp-derived id a bounded number of times.

use tracing::{debug, info};

use crate::complaint::Complaint;
use crate::error::{Error, Result};
use crate::location::Position;
use crate::photo::PhotoTray;
use crate::store::Repository;

/// How many bumped ids to try before giving up on a collision.
const MAX_ID_ATTEMPTS: u32 = 5;

/// Submit a new report.
///
/// # Errors
///
/// Returns [`Error::MissingPhoto`] if the tray is empty,
/// [`Error::MissingLocation`] if no position was resolved, or a storage
/// error.
pub fn submit(
    repo: &mut Repository,
    tray: PhotoTray,
    position: Option<Position>,
    description: Option<String>,
) -> Result<Complaint> {
    if tray.is_empty() {
        return Err(Error::MissingPhoto);
    }
    let Some(position) = position else {
        return Err(Error::MissingLocation);
    };

    let complaint = Complaint::new(tray.into_photos(), position, description);
    submit_complaint(repo, complaint)
}

/// Insert a prepared complaint, bumping the id on collision.
pub(crate) fn submit_complaint(repo: &mut Repository, mut complaint: Complaint) -> Result<Complaint> {
    for bump in 1..=MAX_ID_ATTEMPTS {
        match repo.insert(&complaint) {
            Ok(()) => {
                info!(
                    id = %complaint.id,
                    images = complaint.image_count(),
                    "Complaint submitted"
                );
                return Ok(complaint);
            }
            Err(e) if e.is_duplicate() => {
                debug!(id = %complaint.id, "Id collision, bumping");
                complaint.id = Complaint::id_from_timestamp(complaint.timestamp, bump);
            }
            Err(e) => return Err(e),
        }
    }
    Err(Error::DuplicateComplaint { id: complaint.id })
}
