//! Command-line interface for firstaid.
//!
//! This module provides the CLI structure for the `firstaid` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CallCommand, CategoriesCommand, ConfigCommand, ContactsCommand, ShowCommand, StartCommand,
};

/// firstaid - Step-by-step first aid in an emergency
///
/// Walks you through first aid for choking, bleeding and CPR, reads each
/// step aloud and calls the emergency number when you need it.
#[derive(Debug, Parser)]
#[command(name = "firstaid")]
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
    /// List emergency categories
    Categories(CategoriesCommand),

    /// Start a guided first aid session
    Start(StartCommand),

    /// Print the guide for a category
    Show(ShowCommand),

    /// Call the emergency number or a contact right away
    Call(CallCommand),

    /// List emergency contacts
    Contacts(ContactsCommand),

    /// Check the built-in guides for broken steps and branches
    Validate,

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
