//! ntsdoc - Non-technical summary document generator
//!
//! A CLI tool that renders a project record's summary answers into a
//! .docx form.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use ntsdoc::{matrix, NarrativeField, ProjectRecord, RenderConfig};
use std::path::{Path, PathBuf};

/// Main entry point for the ntsdoc CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            config,
            verbose,
        } => {
            init_logging(verbose);
            handle_render_command(&input, output, config.as_deref())?;
        }

        Commands::Check { input, verbose } => {
            init_logging(verbose);
            handle_check_command(&input)?;
        }
    }

    Ok(())
}

/// Initialize logging; `--verbose` raises the level to Info
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// Read and decode a project record
fn load_project(input: &Path) -> Result<ProjectRecord> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    ProjectRecord::from_json(&json)
        .with_context(|| format!("Failed to parse project record {}", input.display()))
}

/// Handle the render command
fn handle_render_command(input: &Path, mut output: PathBuf, config: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => RenderConfig::default(),
    };

    if output.extension().is_none() {
        output.set_extension("docx");
    }

    println!("Rendering summary...");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    let project = load_project(input)?;
    let bytes = ntsdoc::build_summary(&project, &config)
        .with_context(|| format!("Failed to build summary for {}", input.display()))?;

    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✓ Successfully wrote: {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

/// Handle the check command
fn handle_check_command(input: &Path) -> Result<()> {
    let project = load_project(input)?;

    println!("Project: {}", project.title());
    if let Some(duration) = &project.data.duration {
        println!("Duration: {}", duration.describe());
    }

    for field in NarrativeField::ALL {
        let text = project.data.narrative(field);
        if text.is_empty() {
            println!("  {}: empty", field.key());
            continue;
        }

        println!("  {}: {} blocks", field.key(), text.nodes.len());
        for (index, table) in text.tables().into_iter().enumerate() {
            let normalized = matrix::normalize(table);
            let spanning = normalized.placements().filter(|p| p.is_spanning()).count();
            println!(
                "    table {}: {} x {} ({} spanning cells)",
                index + 1,
                normalized.rows(),
                normalized.cols(),
                spanning
            );
        }
    }

    println!("\n✓ Check completed");
    Ok(())
}
