//! Command-line interface definitions for ntsdoc

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the ntsdoc application
#[derive(Parser)]
#[command(name = "ntsdoc")]
#[command(version)]
#[command(about = "Non-technical summary document generator", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for ntsdoc
#[derive(Subcommand)]
pub enum Commands {
    /// Render a project record to a .docx summary
    Render {
        /// Project record (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "output.docx")]
        output: PathBuf,

        /// Rendering configuration (TOML)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse a project record and report what would be rendered
    Check {
        /// Project record (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}
