//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::complaint::Status;

/// Submit command arguments.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Attach a photo file (repeatable, kept in order)
    #[arg(short, long = "photo", value_name = "FILE")]
    pub photos: Vec<PathBuf>,

    /// Free-text description of the littered area
    #[arg(short, long)]
    pub description: Option<String>,

    /// Override the report latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Override the report longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Snap photos from the camera instead of (or on top of) files
    #[arg(long)]
    pub from_camera: bool,

    /// Number of frames to snap from the camera
    #[arg(long, default_value = "1")]
    pub shots: usize,

    /// Turn the torch on for the capture session
    #[arg(long)]
    pub torch: bool,

    /// Keep the camera session open, accumulating frames for this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub watch_secs: Option<u64>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Filter by status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Dashboard command arguments.
#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status reassignment command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// The complaint id
    pub id: String,

    /// The new status
    #[arg(value_enum)]
    pub status: StatusArg,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// The complaint id
    pub id: String,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// The complaint id
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Export the decoded photos into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

/// Map command arguments.
#[derive(Debug, Args)]
pub struct MapCommand {
    /// The complaint id
    pub id: String,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Path to the legacy JSON dump
    pub file: PathBuf,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write to this file instead of stdout
    pub file: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Status argument for filtering and reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Filed, awaiting attention
    Submitted,
    /// Cleanup underway
    InProgress,
    /// Cleaned up
    Resolved,
}

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Submitted => Self::Submitted,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Resolved => Self::Resolved,
        }
    }
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_arg_conversion() {
        assert_eq!(Status::from(StatusArg::Submitted), Status::Submitted);
        assert_eq!(Status::from(StatusArg::InProgress), Status::InProgress);
        assert_eq!(Status::from(StatusArg::Resolved), Status::Resolved);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_submit_command_debug() {
        let cmd = SubmitCommand {
            photos: vec![PathBuf::from("scene.jpg")],
            description: None,
            lat: None,
            lon: None,
            from_camera: false,
            shots: 1,
            torch: false,
            watch_secs: None,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("scene.jpg"));
    }

    #[test]
    fn test_status_command_debug() {
        let cmd = StatusCommand {
            id: "1700000000000".to_string(),
            status: StatusArg::Resolved,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Resolved"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }

    #[test]
    fn test_status_arg_clone() {
        let arg = StatusArg::InProgress;
        let cloned = arg;
        assert_eq!(arg, cloned);
    }

    #[test]
    fn test_output_format_clone() {
        let format = OutputFormat::Table;
        let cloned = format;
        assert_eq!(format, cloned);
    }
}
