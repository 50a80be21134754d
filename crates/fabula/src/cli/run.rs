//! Storyboard run command handler.

use fabula::{FabulaConfig, FabulaResult, ImageStatus, PipelineReport, build_orchestrator};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Load configuration, apply command-line overrides and run the pipeline.
#[instrument(skip_all)]
pub async fn run_storyboard(
    output_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    no_consolidation: bool,
) -> FabulaResult<()> {
    let mut config = FabulaConfig::load(config_path.as_deref())?;
    if let Some(dir) = output_dir {
        config = config.with_output_dir(dir);
    }
    if no_consolidation {
        config = config.with_consolidated_context(false);
    }

    let mut orchestrator = build_orchestrator(&config)?;
    let report = orchestrator.run().await?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &PipelineReport) {
    println!("Characters:");
    for character in report.characters() {
        println!(
            "  {}: {}",
            character.name(),
            character.visual_prompt().as_deref().unwrap_or("-")
        );
    }

    println!("\nSummary:\n{}\n", report.summary());

    println!("Scenes:");
    for (index, outcome) in report.outcomes().iter().enumerate() {
        match outcome.status() {
            ImageStatus::Saved(paths) => {
                for path in paths {
                    println!("  {}. {}", index + 1, path.display());
                }
            }
            ImageStatus::MalformedPrompt(reason) => {
                println!("  {}. no image prompt ({})", index + 1, reason);
            }
            ImageStatus::GenerationFailed(reason) => {
                println!("  {}. image failed ({})", index + 1, reason);
            }
        }
    }

    println!("\nHistory: {}", report.history_path().display());
    info!(
        images = report.image_paths().len(),
        failed_scenes = report.failed_scenes(),
        "Storyboard finished"
    );
}
