//! Command-line interface for littersnap.
//!
//! This module provides the CLI structure and command handlers for the
//! `litsnap` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DashboardCommand, DeleteCommand, ExportCommand, ImportCommand, ListCommand,
    MapCommand, OutputFormat, ShowCommand, StatusArg, StatusCommand, SubmitCommand,
};

/// litsnap - Report littered areas and track their cleanup
///
/// Capture photos of a littered spot, attach its location, file a complaint,
/// and follow its resolution status, all stored locally on this machine.
#[derive(Debug, Parser)]
#[command(name = "litsnap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// File a new complaint
    Submit(SubmitCommand),

    /// List complaints
    List(ListCommand),

    /// Show status counts and recent complaints
    Dashboard(DashboardCommand),

    /// Reassign the status of a complaint
    Status(StatusCommand),

    /// Delete a complaint
    Delete(DeleteCommand),

    /// Show one complaint in detail
    Show(ShowCommand),

    /// Print map links for a complaint
    Map(MapCommand),

    /// Import a legacy JSON dump
    Import(ImportCommand),

    /// Export all complaints as JSON
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
