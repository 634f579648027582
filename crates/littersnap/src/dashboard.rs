//! Dashboard rendering for littersnap.
//!
//! Text rendering for the tracking surfaces: aggregate status counts, the
//! complaint list, and the per-record detail view with its ordered images.
//! All functions are pure; the CLI decides where the text goes.

use std::fmt::Write as _;

use crate::complaint::{Complaint, Status};
use crate::mapembed;
use crate::store::StatusCounts;

/// Maximum description length in list views before truncation.
const DESCRIPTION_WIDTH: usize = 40;

/// Render the aggregate counts per status.
#[must_use]
pub fn render_summary(counts: &StatusCounts) -> String {
    let mut out = String::new();
    for status in Status::ALL {
        let _ = writeln!(
            out,
            "{:<12} {}",
            format!("{}:", status.label()),
            counts.for_status(status)
        );
    }
    let _ = writeln!(out, "{:<12} {}", "Total:", counts.total());
    out
}

/// Render complaints as a fixed-width table, one row per record.
#[must_use]
pub fn render_table(complaints: &[Complaint]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<15} {:<17} {:<12} {:>6}  {:<25} {}",
        "ID", "TIME", "STATUS", "PHOTOS", "LOCATION", "DESCRIPTION"
    );
    for complaint in complaints {
        let _ = writeln!(
            out,
            "{:<15} {:<17} {:<12} {:>6}  {:<25} {}",
            complaint.id,
            complaint.timestamp.format("%Y-%m-%d %H:%M"),
            complaint.status.label(),
            complaint.image_count(),
            mapembed::format_position(complaint.latitude, complaint.longitude),
            truncate(&complaint.description, DESCRIPTION_WIDTH),
        );
    }
    out
}

/// Render complaints as plain lines.
#[must_use]
pub fn render_lines(complaints: &[Complaint]) -> String {
    let mut out = String::new();
    for complaint in complaints {
        let _ = writeln!(
            out,
            "{} [{}] {} ({} photos) {}",
            complaint.id,
            complaint.status.label(),
            mapembed::format_position(complaint.latitude, complaint.longitude),
            complaint.image_count(),
            truncate(&complaint.description, DESCRIPTION_WIDTH),
        );
    }
    out
}

/// Render the detail view of a single complaint.
///
/// Lists every image in order with its media type and size, plus map links
/// for the captured coordinates.
#[must_use]
pub fn render_detail(complaint: &Complaint) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Complaint {}", complaint.id);
    let _ = writeln!(out, "  Filed:       {}", complaint.timestamp.to_rfc3339());
    let _ = writeln!(out, "  Status:      {}", complaint.status.label());
    let _ = writeln!(
        out,
        "  Location:    {}",
        mapembed::format_position(complaint.latitude, complaint.longitude)
    );
    if complaint.description.is_empty() {
        let _ = writeln!(out, "  Description: (none)");
    } else {
        let _ = writeln!(out, "  Description: {}", complaint.description);
    }
    let _ = writeln!(out, "  Photos:      {}", complaint.image_count());
    for (index, photo) in complaint.images.iter().enumerate() {
        let _ = writeln!(
            out,
            "    [{index}] {} ({} bytes)",
            photo.media_type(),
            photo.byte_len()
        );
    }
    let _ = writeln!(
        out,
        "  Map:         {}",
        mapembed::osm_url(complaint.latitude, complaint.longitude)
    );
    out
}

/// Truncate a string to at most `width` characters, appending an ellipsis.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Position;
    use crate::photo::Photo;

    fn test_complaint() -> Complaint {
        let mut complaint = Complaint::new(
            vec![
                Photo::from_bytes(b"one", "image/png").unwrap(),
                Photo::from_bytes(b"two", "image/jpeg").unwrap(),
            ],
            Position::new(37.422, -122.084).unwrap(),
            Some("overflowing bin by the bus stop".to_string()),
        );
        complaint.id = "1700000000000".to_string();
        complaint
    }

    #[test]
    fn test_render_summary_contains_all_statuses() {
        let counts = StatusCounts {
            submitted: 2,
            in_progress: 1,
            resolved: 3,
        };
        let rendered = render_summary(&counts);

        assert!(rendered.contains("Submitted:"));
        assert!(rendered.contains("In Progress:"));
        assert!(rendered.contains("Resolved:"));
        assert!(rendered.contains("Total:"));
        assert!(rendered.contains('6'));
    }

    #[test]
    fn test_render_table_has_header_and_rows() {
        let rendered = render_table(&[test_complaint()]);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ID"));
        assert!(lines[0].contains("LOCATION"));
        assert!(lines[1].contains("1700000000000"));
        assert!(lines[1].contains("Submitted"));
    }

    #[test]
    fn test_render_table_coordinates_have_six_decimals() {
        let rendered = render_table(&[test_complaint()]);
        assert!(rendered.contains("37.422000"));
        assert!(rendered.contains("-122.084000"));
    }

    #[test]
    fn test_render_lines() {
        let rendered = render_lines(&[test_complaint()]);
        assert!(rendered.contains("1700000000000"));
        assert!(rendered.contains("[Submitted]"));
        assert!(rendered.contains("(2 photos)"));
    }

    #[test]
    fn test_render_detail_lists_images_in_order() {
        let rendered = render_detail(&test_complaint());

        assert!(rendered.contains("Complaint 1700000000000"));
        assert!(rendered.contains("[0] image/png"));
        assert!(rendered.contains("[1] image/jpeg"));
        assert!(rendered.contains("openstreetmap.org"));
        assert!(rendered.contains("37.422000, -122.084000"));
    }

    #[test]
    fn test_render_detail_empty_description() {
        let mut complaint = test_complaint();
        complaint.description = String::new();
        let rendered = render_detail(&complaint);
        assert!(rendered.contains("(none)"));
    }

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_string() {
        let truncated = truncate("a very long description indeed", 10);
        assert_eq!(truncated.chars().count(), 10);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let truncated = truncate("강변에 쓰레기가 많이 버려져 있어요", 5);
        assert_eq!(truncated.chars().count(), 5);
    }
}
