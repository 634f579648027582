//! Map links and coordinate display for littersnap.
//!
//! Presentational only: formats a complaint's coordinate pair as map links
//! and renders coordinates with at least six decimal digits.

/// Format a coordinate with no fewer than six decimal digits.
///
/// Coordinates carrying more precision keep it; shorter ones are padded to
/// six digits.
#[must_use]
pub fn format_coord(value: f64) -> String {
    let plain = value.to_string();
    let decimals = plain.split('.').nth(1).map_or(0, str::len);
    if decimals >= 6 && !plain.contains('e') {
        plain
    } else {
        format!("{value:.6}")
    }
}

/// Format a coordinate pair for display.
#[must_use]
pub fn format_position(latitude: f64, longitude: f64) -> String {
    format!("{}, {}", format_coord(latitude), format_coord(longitude))
}

/// OpenStreetMap link centered on the given coordinates.
#[must_use]
pub fn osm_url(latitude: f64, longitude: f64) -> String {
    let lat = format_coord(latitude);
    let lon = format_coord(longitude);
    format!("https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=18/{lat}/{lon}")
}

/// Google Maps link for the given coordinates.
#[must_use]
pub fn gmaps_url(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.google.com/maps?q={},{}",
        format_coord(latitude),
        format_coord(longitude)
    )
}
