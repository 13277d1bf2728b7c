//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "sqlgate")]
#[command(author, version, about = "Multi-dialect SQL syntax validator")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate every statement in SQL files
    Check {
        /// SQL files to check (supports glob patterns)
        files: Vec<PathBuf>,

        /// SQL dialect (sqlserver, postgresql, mysql, sqlite)
        #[arg(short, long)]
        dialect: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Configuration file (defaults to the nearest sqlgate.toml)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the kind of a single statement
    Classify {
        /// SQL statement
        sql: String,

        /// SQL dialect
        #[arg(short, long, default_value = "sqlserver")]
        dialect: String,
    },

    /// Print the tables a single statement references
    Tables {
        /// SQL statement
        sql: String,

        /// SQL dialect
        #[arg(short, long, default_value = "sqlserver")]
        dialect: String,
    },

    /// List the dialects with a registered validator
    Dialects,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output
    Json,
}
