//! Generate command - one round on a fresh or existing project

use super::{open_session, run_round};
use crate::config::SettingsManager;
use crate::project_files::{read_project_dir, write_document, write_project};
use crate::ui;
use anyhow::{Context, Result};
use colored::Colorize;
use loom_core::{build_preview, ProjectStore, RoundStatus};
use std::path::PathBuf;

pub struct GenerateOptions {
    pub instruction: String,
    /// Seed the project from this directory and write results back to it
    pub out_dir: Option<PathBuf>,
    /// Also write the bundled preview document here
    pub preview: Option<PathBuf>,
    pub plan: bool,
}

pub async fn run(opts: GenerateOptions) -> Result<()> {
    let mut settings = SettingsManager::load().context("Failed to load settings")?;
    if opts.plan {
        settings.plan_mode = true;
    }

    let store = match &opts.out_dir {
        Some(dir) if dir.is_dir() => ProjectStore::from_files(read_project_dir(dir)?),
        _ => ProjectStore::new(),
    };

    let (orchestrator, options) = open_session(&settings, store)?;
    let report = run_round(&orchestrator, &opts.instruction, &options).await?;
    ui::print_report(&report);

    if let RoundStatus::Failed(message) = &report.status {
        anyhow::bail!("Generation failed: {}", message);
    }
    if report.status == RoundStatus::Cancelled {
        return Ok(());
    }

    let project = orchestrator.snapshot().await;

    if let Some(dir) = &opts.out_dir {
        let written = write_project(dir, &project)?;
        // files deleted this round are removed from disk too
        for op in report.operations.iter().filter(|op| op.is_delete()) {
            if let Some(relative) = crate::project_files::safe_relative_path(&op.path) {
                let target = dir.join(relative);
                if target.is_file() {
                    std::fs::remove_file(&target)
                        .with_context(|| format!("Failed to remove {:?}", target))?;
                }
            }
        }
        println!(
            "{} Wrote {} file(s) to {}",
            "✓".green(),
            written,
            dir.display().to_string().cyan()
        );
    } else if !project.is_empty() {
        println!();
        println!("{}", "Use --out-dir to write the files to disk.".dimmed());
    }

    if let Some(path) = &opts.preview {
        write_document(path, &build_preview(&project))?;
        println!(
            "{} Preview written to {}",
            "✓".green(),
            path.display().to_string().cyan()
        );
    }

    Ok(())
}
