//! Spool-directory camera for littersnap.
//!
//! A camera device on this platform is a directory that still frames land in
//! (a phone sync folder, a `v4l2` snapshot script, a scanner drop). The spool
//! camera hands out an exclusive session over that directory; the session
//! serves frames in arrival order, skips duplicates, and exposes a torch
//! toggle when the underlying device reports one.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant};
use tracing::{debug, trace, warn};

/// Name of the lock file that marks a directory as held by a session.
const LOCK_FILE_NAME: &str = ".capture.lock";

/// File extensions the spool camera treats as frames, with their media types.
const FRAME_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// Errors that can occur while operating the spool camera.
#[derive(Debug, Error)]
pub enum SpoolError {
    /// The spool directory could not be accessed.
    #[error("spool access failed: {0}")]
    AccessFailed(String),

    /// Another session already holds the camera.
    #[error("camera is busy: {0} is locked by another session")]
    Busy(PathBuf),

    /// The session has been released.
    #[error("camera session is closed")]
    SessionClosed,

    /// The device reports no torch capability.
    #[error("this camera has no torch")]
    TorchUnsupported,
}

/// Result type for spool camera operations.
pub type Result<T> = std::result::Result<T, SpoolError>;

/// A still frame read from the spool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw image bytes.
    pub bytes: Vec<u8>,

    /// Media type derived from the frame's file extension.
    pub media_type: String,

    /// BLAKE3 hash of the bytes, for duplicate detection.
    pub content_hash: String,

    /// When the frame was picked up by the session.
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    /// Create a frame from raw bytes, computing the content hash.
    #[must_use]
    pub fn new(bytes: Vec<u8>, media_type: String) -> Self {
        let content_hash = blake3::hash(&bytes).to_hex().to_string();
        Self {
            bytes,
            media_type,
            content_hash,
            captured_at: Utc::now(),
        }
    }

    /// Size of the frame payload in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Configuration for a spool camera.
#[derive(Debug, Clone)]
pub struct SpoolCameraConfig {
    /// Directory the device writes frames into.
    pub spool_dir: PathBuf,

    /// Interval between spool checks in streaming mode.
    pub poll_interval: Duration,

    /// Whether the device has a torch.
    pub torch_available: bool,

    /// Minimum frame size to accept.
    pub min_frame_bytes: usize,

    /// Maximum frame size to accept.
    pub max_frame_bytes: usize,
}

impl Default for SpoolCameraConfig {
    fn default() -> Self {
        Self {
            spool_dir: PathBuf::from("spool"),
            poll_interval: Duration::from_millis(500),
            torch_available: false,
            min_frame_bytes: 1,
            max_frame_bytes: 10 * 1024 * 1024,
        }
    }
}

/// A camera backed by a spool directory.
///
/// The camera itself is cheap to construct; all device state lives in the
/// session obtained from [`SpoolCamera::open_session`].
#[derive(Debug, Clone)]
pub struct SpoolCamera {
    config: SpoolCameraConfig,
}

impl SpoolCamera {
    /// Create a camera over the given spool configuration.
    #[must_use]
    pub fn new(config: SpoolCameraConfig) -> Self {
        Self { config }
    }

    /// Whether the device reports a torch.
    #[must_use]
    pub fn torch_available(&self) -> bool {
        self.config.torch_available
    }

    /// The spool directory this camera reads from.
    #[must_use]
    pub fn spool_dir(&self) -> &Path {
        &self.config.spool_dir
    }

    /// Acquire the camera exclusively.
    ///
    /// Creates the spool directory if needed and takes the session lock.
    ///
    /// # Errors
    ///
    /// Returns [`SpoolError::Busy`] if another session holds the lock, or
    /// [`SpoolError::AccessFailed`] if the directory cannot be prepared.
    pub fn open_session(&self) -> Result<SpoolSession> {
        fs::create_dir_all(&self.config.spool_dir)
            .map_err(|e| SpoolError::AccessFailed(e.to_string()))?;

        let lock_path = self.config.spool_dir.join(LOCK_FILE_NAME);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(SpoolError::Busy(self.config.spool_dir.clone()));
            }
            Err(e) => return Err(SpoolError::AccessFailed(e.to_string())),
        }

        debug!(spool = %self.config.spool_dir.display(), "Camera session acquired");
        Ok(SpoolSession {
            config: self.config.clone(),
            lock_path,
            active: true,
            torch_on: false,
            consumed: HashSet::new(),
            last_hash: None,
        })
    }
}

/// An exclusive capture session over a spool directory.
///
/// Holds the session lock until [`SpoolSession::release`] is called; dropping
/// an active session releases the lock best-effort.
#[derive(Debug)]
pub struct SpoolSession {
    config: SpoolCameraConfig,
    lock_path: PathBuf,
    active: bool,
    torch_on: bool,
    consumed: HashSet<PathBuf>,
    last_hash: Option<String>,
}

impl SpoolSession {
    /// Check if the session still holds the camera.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current torch state.
    #[must_use]
    pub fn torch_on(&self) -> bool {
        self.torch_on
    }

    /// Toggle the torch.
    ///
    /// # Errors
    ///
    /// Returns [`SpoolError::TorchUnsupported`] if the device has no torch,
    /// or [`SpoolError::SessionClosed`] if the session was released.
    pub fn set_torch(&mut self, on: bool) -> Result<()> {
        if !self.active {
            return Err(SpoolError::SessionClosed);
        }
        if !self.config.torch_available {
            return Err(SpoolError::TorchUnsupported);
        }
        debug!(on, "Torch toggled");
        self.torch_on = on;
        Ok(())
    }

    /// Snap the next frame from the spool.
    ///
    /// Returns `Ok(None)` when no new acceptable frame is present. Frames are
    /// served in arrival order (modification time, then name); frames outside
    /// the configured size bounds and frames identical to the previous one
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the session was released or the spool cannot be
    /// read.
    pub fn snap(&mut self) -> Result<Option<Frame>> {
        if !self.active {
            return Err(SpoolError::SessionClosed);
        }

        for path in self.pending_paths()? {
            self.consumed.insert(path.clone());

            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read frame, skipping");
                    continue;
                }
            };

            if bytes.len() < self.config.min_frame_bytes {
                trace!(
                    path = %path.display(),
                    len = bytes.len(),
                    min = self.config.min_frame_bytes,
                    "Frame too small, skipping"
                );
                continue;
            }
            if bytes.len() > self.config.max_frame_bytes {
                debug!(
                    path = %path.display(),
                    len = bytes.len(),
                    max = self.config.max_frame_bytes,
                    "Frame too large, skipping"
                );
                continue;
            }

            let media_type = media_type_for(&path);
            let frame = Frame::new(bytes, media_type);

            if self.last_hash.as_ref() == Some(&frame.content_hash) {
                trace!(path = %path.display(), "Duplicate frame, skipping");
                continue;
            }

            debug!(
                path = %path.display(),
                len = frame.byte_len(),
                hash = %frame.content_hash[..16.min(frame.content_hash.len())],
                "Frame captured"
            );
            self.last_hash = Some(frame.content_hash.clone());
            return Ok(Some(frame));
        }

        Ok(None)
    }

    /// Stream frames as they arrive in the spool.
    ///
    /// Polls the spool at the configured interval and sends each accepted
    /// frame through `tx` until `max_frames` have been sent, the `window`
    /// elapses, or the receiver is dropped. Returns the number of frames
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session was released or the spool cannot be
    /// read.
    pub async fn stream(
        &mut self,
        tx: mpsc::Sender<Frame>,
        max_frames: usize,
        window: Duration,
    ) -> Result<usize> {
        if !self.active {
            return Err(SpoolError::SessionClosed);
        }

        let deadline = Instant::now() + window;
        let mut ticker = interval(self.config.poll_interval);
        let mut sent = 0usize;

        while sent < max_frames {
            ticker.tick().await;
            if Instant::now() >= deadline {
                debug!(sent, "Capture window elapsed");
                break;
            }

            while sent < max_frames {
                let Some(frame) = self.snap()? else { break };
                if tx.send(frame).await.is_err() {
                    debug!(sent, "Frame receiver dropped, stopping stream");
                    return Ok(sent);
                }
                sent += 1;
            }
        }

        Ok(sent)
    }

    /// Release the camera.
    ///
    /// Removes the session lock; the session cannot be used afterwards.
    /// Releasing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be removed.
    pub fn release(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.torch_on = false;
        match fs::remove_file(&self.lock_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(SpoolError::AccessFailed(e.to_string())),
        }
        debug!(spool = %self.config.spool_dir.display(), "Camera session released");
        Ok(())
    }

    /// Frame paths not yet consumed, in arrival order.
    fn pending_paths(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.config.spool_dir)
            .map_err(|e| SpoolError::AccessFailed(e.to_string()))?;

        let mut frames: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SpoolError::AccessFailed(e.to_string()))?;
            let path = entry.path();
            if !path.is_file() || !is_frame_file(&path) || self.consumed.contains(&path) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            frames.push((modified, path));
        }

        frames.sort();
        Ok(frames.into_iter().map(|(_, path)| path).collect())
    }
}

impl Drop for SpoolSession {
    fn drop(&mut self) {
        if self.active {
            debug!(spool = %self.config.spool_dir.display(), "Session dropped while active, releasing");
            self.active = false;
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

/// Check whether a path looks like a frame file.
fn is_frame_file(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| FRAME_EXTENSIONS.iter().any(|(e, _)| *e == ext))
        .unwrap_or(false)
}

/// Media type for a frame path, falling back to JPEG.
fn media_type_for(path: &Path) -> String {
    extension_of(path)
        .and_then(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .find(|(e, _)| *e == ext)
                .map(|(_, mt)| (*mt).to_string())
        })
        .unwrap_or_else(|| "image/jpeg".to_string())
}

/// Lowercased extension of a path.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}
