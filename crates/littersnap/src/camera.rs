//! Camera capability for littersnap.
//!
//! This module defines the camera seam: a [`CameraDevice`] hands out an
//! exclusive [`CameraSession`], which snaps still frames into [`Photo`]s,
//! optionally toggles a torch, and must be released when the capture flow
//! ends. The shipped implementation wraps the spool-directory camera from
//! `littersnap-devices`.

use std::time::Duration;

use littersnap_devices::spool::{SpoolCamera, SpoolError, SpoolSession};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

use crate::photo::Photo;

/// Errors that can occur while operating a camera.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The camera is held by another session.
    #[error("camera is busy: {0}")]
    Busy(String),

    /// The camera could not be acquired.
    #[error("failed to acquire camera: {0}")]
    AcquireFailed(String),

    /// A frame could not be captured.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),

    /// The device reports no torch capability.
    #[error("this camera has no torch")]
    TorchUnsupported,

    /// The session has been released.
    #[error("camera session is closed")]
    SessionClosed,
}

impl From<SpoolError> for CameraError {
    fn from(err: SpoolError) -> Self {
        match err {
            SpoolError::Busy(path) => Self::Busy(path.display().to_string()),
            SpoolError::AccessFailed(msg) => Self::CaptureFailed(msg),
            SpoolError::TorchUnsupported => Self::TorchUnsupported,
            SpoolError::SessionClosed => Self::SessionClosed,
        }
    }
}

/// Result type for camera operations.
pub type Result<T> = std::result::Result<T, CameraError>;

/// Options for a streamed multi-photo capture.
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    /// Stop after this many photos.
    pub max_shots: usize,

    /// Stop when this much time has elapsed.
    pub window: Duration,
}

/// A camera device that can be acquired for an exclusive capture session.
#[async_trait::async_trait]
pub trait CameraDevice: Send + Sync {
    /// The name of this device (for logging).
    fn name(&self) -> &'static str;

    /// Whether the device reports a torch.
    fn has_torch(&self) -> bool;

    /// Acquire the camera exclusively.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::Busy`] if another session holds the device, or
    /// [`CameraError::AcquireFailed`] if it cannot be opened. Acquisition is
    /// not retried; a failure is surfaced once.
    async fn acquire(&self) -> Result<Box<dyn CameraSession>>;
}

/// An exclusive capture session.
#[async_trait::async_trait]
pub trait CameraSession: Send {
    /// Check if the session still holds the camera.
    fn is_active(&self) -> bool;

    /// Current torch state.
    fn torch_on(&self) -> bool;

    /// Toggle the torch.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::TorchUnsupported`] if the device has no torch.
    fn set_torch(&mut self, on: bool) -> Result<()>;

    /// Snap the next still frame.
    ///
    /// Returns `Ok(None)` when no new frame is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the session was released or capture fails.
    async fn snap(&mut self) -> Result<Option<Photo>>;

    /// Stream photos as frames arrive, until the options are exhausted or
    /// the receiver is dropped. Returns the number of photos sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session was released or capture fails.
    async fn stream(&mut self, tx: mpsc::Sender<Photo>, opts: StreamOptions) -> Result<usize>;

    /// Release the camera. Releasing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be released cleanly.
    async fn release(&mut self) -> Result<()>;
}

/// The spool-directory camera device.
#[derive(Debug, Clone)]
pub struct SpoolCameraDevice {
    camera: SpoolCamera,
}

impl SpoolCameraDevice {
    /// Create a device over the given spool camera.
    #[must_use]
    pub fn new(camera: SpoolCamera) -> Self {
        Self { camera }
    }

    /// Create a device from the application configuration.
    #[must_use]
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(SpoolCamera::new(config.spool_camera_config()))
    }
}

#[async_trait::async_trait]
impl CameraDevice for SpoolCameraDevice {
    fn name(&self) -> &'static str {
        "spool"
    }

    fn has_torch(&self) -> bool {
        self.camera.torch_available()
    }

    async fn acquire(&self) -> Result<Box<dyn CameraSession>> {
        let session = self.camera.open_session().map_err(|e| match e {
            SpoolError::Busy(path) => CameraError::Busy(path.display().to_string()),
            other => CameraError::AcquireFailed(other.to_string()),
        })?;
        Ok(Box::new(SpoolCameraSession { inner: session }))
    }
}

/// Session adapter over [`SpoolSession`], converting frames into photos.
#[derive(Debug)]
struct SpoolCameraSession {
    inner: SpoolSession,
}

#[async_trait::async_trait]
impl CameraSession for SpoolCameraSession {
    fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    fn torch_on(&self) -> bool {
        self.inner.torch_on()
    }

    fn set_torch(&mut self, on: bool) -> Result<()> {
        self.inner.set_torch(on).map_err(Into::into)
    }

    async fn snap(&mut self) -> Result<Option<Photo>> {
        match self.inner.snap()? {
            Some(frame) => match Photo::from_frame(&frame) {
                Ok(photo) => Ok(Some(photo)),
                Err(e) => Err(CameraError::CaptureFailed(e.to_string())),
            },
            None => Ok(None),
        }
    }

    async fn stream(&mut self, tx: mpsc::Sender<Photo>, opts: StreamOptions) -> Result<usize> {
        let (frame_tx, mut frame_rx) = mpsc::channel(8);

        let stream = self.inner.stream(frame_tx, opts.max_shots, opts.window);
        let forward = async {
            let mut forwarded = 0usize;
            while let Some(frame) = frame_rx.recv().await {
                match Photo::from_frame(&frame) {
                    Ok(photo) => {
                        if tx.send(photo).await.is_err() {
                            break;
                        }
                        forwarded += 1;
                    }
                    Err(e) => {
                        warn!(error = %e, "Dropping frame that is not a valid photo");
                    }
                }
            }
            forwarded
        };

        let (streamed, forwarded) = tokio::join!(stream, forward);
        streamed?;
        Ok(forwarded)
    }

    async fn release(&mut self) -> Result<()> {
        self.inner.release().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use littersnap_devices::spool::SpoolCameraConfig;
    use std::path::PathBuf;

    fn test_spool(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "littersnap_camera_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("failed to create test spool");
        dir
    }

    fn test_device(spool_dir: PathBuf, torch: bool) -> SpoolCameraDevice {
        SpoolCameraDevice::new(SpoolCamera::new(SpoolCameraConfig {
            spool_dir,
            poll_interval: Duration::from_millis(10),
            torch_available: torch,
            ..SpoolCameraConfig::default()
        }))
    }

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 9, 9];

    #[tokio::test]
    async fn test_acquire_and_snap() {
        let dir = test_spool("snap");
        std::fs::write(dir.join("shot.png"), PNG).unwrap();
        let device = test_device(dir.clone(), false);
        assert_eq!(device.name(), "spool");

        let mut session = device.acquire().await.unwrap();
        assert!(session.is_active());

        let photo = session.snap().await.unwrap().unwrap();
        assert_eq!(photo.media_type(), "image/png");
        assert!(session.snap().await.unwrap().is_none());

        session.release().await.unwrap();
        assert!(!session.is_active());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_acquire_busy() {
        let dir = test_spool("busy");
        let device = test_device(dir.clone(), false);

        let _session = device.acquire().await.unwrap();
        let second = device.acquire().await;
        assert!(matches!(second, Err(CameraError::Busy(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_torch_capability() {
        let dir = test_spool("torch");
        let device = test_device(dir.clone(), true);
        assert!(device.has_torch());

        let mut session = device.acquire().await.unwrap();
        session.set_torch(true).unwrap();
        assert!(session.torch_on());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_torch_unsupported() {
        let dir = test_spool("no_torch");
        let device = test_device(dir.clone(), false);
        assert!(!device.has_torch());

        let mut session = device.acquire().await.unwrap();
        assert!(matches!(
            session.set_torch(true),
            Err(CameraError::TorchUnsupported)
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_stream_forwards_photos() {
        let dir = test_spool("stream");
        std::fs::write(dir.join("a.png"), PNG).unwrap();
        std::fs::write(dir.join("b.jpg"), &[0xFF, 0xD8, 0xFF, 0xE0, 1]).unwrap();
        let device = test_device(dir.clone(), false);

        let mut session = device.acquire().await.unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let sent = session
            .stream(
                tx,
                StreamOptions {
                    max_shots: 2,
                    window: Duration::from_secs(5),
                },
            )
            .await
            .unwrap();
        assert_eq!(sent, 2);

        let mut photos = Vec::new();
        while let Some(photo) = rx.recv().await {
            photos.push(photo);
        }
        assert_eq!(photos.len(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_snap_after_release() {
        let dir = test_spool("released");
        let device = test_device(dir.clone(), false);

        let mut session = device.acquire().await.unwrap();
        session.release().await.unwrap();
        assert!(matches!(
            session.snap().await,
            Err(CameraError::SessionClosed)
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_spool_error_conversion() {
        let err: CameraError = SpoolError::TorchUnsupported.into();
        assert!(matches!(err, CameraError::TorchUnsupported));

        let err: CameraError = SpoolError::SessionClosed.into();
        assert!(matches!(err, CameraError::SessionClosed));
    }
}
