//! Photo payloads for littersnap.
//!
//! A photo is an opaque data-URL encoded image
//! (`data:<media-type>;base64,<payload>`) plus a BLAKE3 content hash. Photos
//! come from two interchangeable paths: reading a selected file, or frames
//! snapped by a camera session. Before submission they accumulate in an
//! ordered [`PhotoTray`].

use std::path::Path;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use littersnap_devices::spool::Frame;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::CameraConfig;
use crate::error::{Error, Result};

/// Matches a base64 image data URL and captures the media type and payload.
fn data_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^data:(image/[a-z0-9.+-]+);base64,([A-Za-z0-9+/]+={0,2})$")
            .expect("data URL pattern is valid")
    })
}

/// Magic-byte signatures for the supported image formats.
const SIGNATURES: &[(&[u8], &str)] = &[
    (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
    (&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
];

/// An image payload attached to a complaint.
///
/// Serializes as its bare data-URL string, which is the canonical on-disk
/// and interchange representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Photo {
    data_url: String,
    content_hash: String,
    byte_len: usize,
}

impl Photo {
    /// Create a photo from raw image bytes and a media type.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are empty or the media type is not an
    /// image type.
    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::photo_decode("empty image payload"));
        }
        if !media_type.starts_with("image/") {
            return Err(Error::photo_decode(format!(
                "not an image media type: {media_type}"
            )));
        }

        let payload = STANDARD.encode(bytes);
        Ok(Self {
            data_url: format!("data:{media_type};base64,{payload}"),
            content_hash: blake3::hash(bytes).to_hex().to_string(),
            byte_len: bytes.len(),
        })
    }

    /// Read a photo from a file, sniffing the media type from magic bytes
    /// and falling back to the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a recognized
    /// image format.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::PhotoRead {
            path: path.to_path_buf(),
            source,
        })?;

        let media_type = sniff_media_type(&bytes)
            .or_else(|| media_type_from_extension(path))
            .ok_or_else(|| {
                Error::photo_decode(format!("unrecognized image format: {}", path.display()))
            })?;

        trace!(path = %path.display(), media_type, len = bytes.len(), "Photo read from file");
        Self::from_bytes(&bytes, media_type)
    }

    /// Parse and validate a data-URL payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a base64 image data URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let captures = data_url_regex()
            .captures(url)
            .ok_or_else(|| Error::photo_decode("not a base64 image data URL"))?;

        let payload = &captures[2];
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| Error::photo_decode(format!("invalid base64 payload: {e}")))?;
        if bytes.is_empty() {
            return Err(Error::photo_decode("empty image payload"));
        }

        Ok(Self {
            data_url: url.to_string(),
            content_hash: blake3::hash(&bytes).to_hex().to_string(),
            byte_len: bytes.len(),
        })
    }

    /// Convert a camera frame into a photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame payload is empty or not an image type.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        Self::from_bytes(&frame.bytes, &frame.media_type)
    }

    /// The full data-URL string.
    #[must_use]
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// BLAKE3 hash of the decoded payload.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Size of the decoded payload in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// The media type embedded in the data URL.
    #[must_use]
    pub fn media_type(&self) -> &str {
        // Constructors guarantee the `data:<type>;` shape.
        let rest = &self.data_url["data:".len()..];
        rest.split(';').next().unwrap_or("image/jpeg")
    }

    /// A file extension suitable for exporting this photo.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.media_type() {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }

    /// Decode the payload back into raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let payload = self
            .data_url
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| Error::photo_decode("missing base64 payload"))?;
        STANDARD
            .decode(payload)
            .map_err(|e| Error::photo_decode(format!("invalid base64 payload: {e}")))
    }
}

impl TryFrom<String> for Photo {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_data_url(&value)
    }
}

impl From<Photo> for String {
    fn from(photo: Photo) -> Self {
        photo.data_url
    }
}

/// Sniff a media type from magic bytes.
#[must_use]
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    for (signature, media_type) in SIGNATURES {
        if bytes.starts_with(signature) {
            return Some(media_type);
        }
    }
    // WebP: RIFF container with a WEBP tag at offset 8.
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    None
}

/// Map a file extension to a media type.
fn media_type_from_extension(path: &Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("png") => Some("image/png"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        _ => None,
    }
}

/// The ordered accumulation of photos for an in-progress report.
///
/// Photos are kept in the order they were added; duplicates (same content
/// hash) are skipped, and size and count bounds are enforced on entry.
#[derive(Debug, Clone)]
pub struct PhotoTray {
    photos: Vec<Photo>,
    min_bytes: usize,
    max_bytes: usize,
    max_photos: usize,
}

impl Default for PhotoTray {
    fn default() -> Self {
        Self::with_limits(1, 10 * 1024 * 1024, 8)
    }
}

impl PhotoTray {
    /// Create a tray with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tray with explicit size and count limits.
    #[must_use]
    pub fn with_limits(min_bytes: usize, max_bytes: usize, max_photos: usize) -> Self {
        Self {
            photos: Vec::new(),
            min_bytes,
            max_bytes,
            max_photos,
        }
    }

    /// Create a tray with limits from the camera configuration.
    #[must_use]
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::with_limits(
            config.min_photo_bytes,
            config.max_photo_bytes,
            config.max_photos,
        )
    }

    /// Add a photo to the tray.
    ///
    /// Returns `Ok(false)` if an identical photo is already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the tray is full or the photo is outside the
    /// accepted size bounds.
    pub fn add(&mut self, photo: Photo) -> Result<bool> {
        if self.photos.len() >= self.max_photos {
            return Err(Error::TrayFull {
                max: self.max_photos,
            });
        }
        if photo.byte_len() < self.min_bytes || photo.byte_len() > self.max_bytes {
            return Err(Error::PhotoSize {
                bytes: photo.byte_len(),
                min: self.min_bytes,
                max: self.max_bytes,
            });
        }
        if self
            .photos
            .iter()
            .any(|p| p.content_hash() == photo.content_hash())
        {
            trace!(hash = %photo.content_hash(), "Duplicate photo, skipping");
            return Ok(false);
        }
        self.photos.push(photo);
        Ok(true)
    }

    /// Remove the photo at the given index.
    pub fn remove(&mut self, index: usize) -> Option<Photo> {
        if index < self.photos.len() {
            Some(self.photos.remove(index))
        } else {
            None
        }
    }

    /// Number of photos in the tray.
    #[must_use]
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Check if the tray is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// The accumulated photos, in order.
    #[must_use]
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Consume the tray, yielding the photos in order.
    #[must_use]
    pub fn into_photos(self) -> Vec<Photo> {
        self.photos
    }
}
