//! CLI command definitions

use clap::Args;

/// Map and lay out a pipeline snapshot
#[derive(Debug, Args, Clone)]
pub struct RenderCommand {
    /// Path to a pipeline snapshot JSON file
    #[arg(short, long)]
    pub file: String,

    /// Output the laid-out graph as JSON
    #[arg(long)]
    pub json: bool,
}

/// Check a pipeline snapshot for structural problems
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to a pipeline snapshot JSON file
    #[arg(short, long)]
    pub file: String,
}

/// List the persisted versions of a pipeline
#[derive(Debug, Args, Clone)]
pub struct VersionsCommand {
    /// Directory holding `<name>.v<version>.json` snapshots
    #[arg(short, long)]
    pub dir: String,

    /// Pipeline name
    #[arg(short, long)]
    pub name: String,

    /// Also fetch and summarize this specific version
    #[arg(long)]
    pub version: Option<u32>,
}
