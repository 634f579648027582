//! Device capability providers for littersnap.
//!
//! This crate holds the concrete device mechanics behind littersnap's
//! capability seams: a spool-directory camera that serves still frames with
//! an exclusive session lifecycle, and location fix sources.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod location;
pub mod spool;

pub use location::{fix_from_env, Fix, FixError};
pub use spool::{Frame, SpoolCamera, SpoolCameraConfig, SpoolError, SpoolSession};
