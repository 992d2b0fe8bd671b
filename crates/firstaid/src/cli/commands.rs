//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Categories command arguments.
#[derive(Debug, Args)]
pub struct CategoriesCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Start command arguments.
#[derive(Debug, Args)]
pub struct StartCommand {
    /// Emergency category to start with (e.g. "choking"); omit to choose
    /// from a menu
    pub category: Option<String>,

    /// Do not read steps aloud
    #[arg(long)]
    pub no_voice: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Category whose guide to print
    pub category: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Call command arguments.
#[derive(Debug, Args)]
pub struct CallCommand {
    /// Call a named emergency contact instead of the main number
    #[arg(long, conflicts_with = "number")]
    pub contact: Option<String>,

    /// Call this number instead of the main number
    #[arg(short, long)]
    pub number: Option<String>,
}

/// Contacts command arguments.
#[derive(Debug, Args)]
pub struct ContactsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
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
