//! `littersnap` - Report littered areas and track their cleanup
//!
//! This library provides the core functionality for filing littered-area
//! complaints: photo capture and upload, one-shot location acquisition,
//! local complaint storage, and the dashboard queries behind the `litsnap`
//! CLI.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod camera;
pub mod cli;
pub mod complaint;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod legacy;
pub mod location;
pub mod logging;
pub mod mapembed;
pub mod photo;
pub mod store;
pub mod submit;

pub use camera::{CameraDevice, CameraSession, SpoolCameraDevice};
pub use complaint::{Complaint, Status};
pub use config::Config;
pub use error::{Error, Result};
pub use location::{LocationProvider, Position};
pub use logging::init_logging;
pub use photo::{Photo, PhotoTray};
pub use store::{Repository, StatusCounts};
