//! CLI module for Voxdoc.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_size, Output};

use clap::{Parser, Subcommand};

/// Voxdoc - ask spoken questions about PDFs
///
/// Upload a PDF, record a question, and hear the answer.
#[derive(Parser, Debug)]
#[command(name = "voxdoc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server and browser client
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long, env = "VOXDOC_HOST")]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long, env = "VOXDOC_PORT")]
        port: Option<u16>,
    },

    /// Store a PDF locally and upload it to the bucket
    Upload {
        /// Path to the PDF
        file: String,
    },

    /// Ask a recorded question about a stored PDF
    Ask {
        /// Name of the PDF as stored (see `voxdoc list`)
        pdf_filename: String,

        /// WAV recording of the question
        audio: String,
    },

    /// List PDFs in the bucket
    List,

    /// Check API keys, directories and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
