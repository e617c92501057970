//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qrdash_core::RecordKind;

use crate::logging::Verbosity;

/// qrdash - manage your QR codes from the terminal
#[derive(Debug, Parser)]
#[command(name = "qrdash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and start a session
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Start a session with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the session and forget the stored token
    Logout,

    /// List your QR codes
    List,

    /// Generate a new QR code
    Create {
        /// url or text
        #[arg(long, default_value = "url")]
        kind: RecordKind,
        #[arg(long)]
        content: String,
        /// Colour as #rrggbb
        #[arg(long, default_value = "#000000")]
        color: String,
    },

    /// Edit an existing QR code. The type cannot be changed.
    Edit {
        id: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a QR code
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
