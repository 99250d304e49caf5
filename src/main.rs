use anyhow::{bail, Context, Result};
use pipegraph::cli::commands::{RenderCommand, ValidateCommand, VersionsCommand};
use pipegraph::cli::output::*;
use pipegraph::cli::{Cli, Command};
use pipegraph::core::Pipeline;
use pipegraph::interaction::InteractionController;
use pipegraph::version::{FileSnapshotStore, VersionNavigator};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Render(cmd) => render_pipeline(cmd)?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::Versions(cmd) => list_versions(cmd)?,
    }

    Ok(())
}

fn render_pipeline(cmd: &RenderCommand) -> Result<()> {
    let pipeline = Pipeline::from_file(&cmd.file)?;
    println!(
        "{} Loaded pipeline: {} (v{})",
        INFO,
        style(&pipeline.name).bold(),
        pipeline.version
    );

    let mut controller = InteractionController::new(pipeline, true);
    if cmd.json {
        let json = serde_json::to_string_pretty(controller.graph())
            .context("Failed to serialize flow graph")?;
        println!("{}", json);
    } else {
        let mut surface = ConsoleSurface::default();
        controller.present(&mut surface);
    }
    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    let pipeline = Pipeline::from_file(&cmd.file)?;
    println!(
        "{} {} ({:?}, v{}, {} steps)",
        INFO,
        style(&pipeline.name).bold(),
        pipeline.meta.kind,
        pipeline.version,
        pipeline.step_count()
    );

    let missing_models = pipeline.steps_without_model();
    for id in &missing_models {
        // tolerated by the core, but worth flagging to the operator
        println!(
            "{} step {} has no model set",
            WARN,
            style(id.as_str()).dim()
        );
    }

    let duplicates = pipeline.duplicate_ids();
    if !duplicates.is_empty() {
        for id in &duplicates {
            println!(
                "{} duplicate step id: {}",
                CROSS,
                style(id.as_str()).red()
            );
        }
        bail!("pipeline violates the unique-id invariant");
    }

    println!("{} Pipeline is structurally valid", CHECK);
    Ok(())
}

fn list_versions(cmd: &VersionsCommand) -> Result<()> {
    let store = FileSnapshotStore::new(&cmd.dir);
    let mut navigator = VersionNavigator::new(store, &cmd.name);

    let latest = navigator.load_latest()?;
    println!(
        "{} {} latest: v{} ({} steps)",
        INFO,
        style(&cmd.name).bold(),
        latest.version,
        latest.step_count()
    );

    for version in navigator.versions() {
        let marker = if Some(version) == navigator.latest_version() {
            style("(latest)").green().to_string()
        } else {
            String::new()
        };
        println!("  v{} {}", version, marker);
    }

    if let Some(version) = cmd.version {
        let step_count = navigator.select(version)?.step_count();
        let mode = if navigator.read_only() {
            style("read-only").yellow().to_string()
        } else {
            style("editable").green().to_string()
        };
        println!("{} v{}: {} steps, {}", CHECK, version, step_count, mode);
    }

    Ok(())
}
