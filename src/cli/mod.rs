//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{RenderCommand, ValidateCommand, VersionsCommand};

/// Pipeline step-tree inspection tool
#[derive(Debug, Parser, Clone)]
#[command(name = "pipegraph")]
#[command(author = "Pipegraph Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Inspect pipeline step trees as laid-out flow graphs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Map and lay out a pipeline snapshot, printing the flow graph
    Render(RenderCommand),

    /// Check a pipeline snapshot for structural problems
    Validate(ValidateCommand),

    /// List the persisted versions of a pipeline
    Versions(VersionsCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
