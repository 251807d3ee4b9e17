//! Preview command - bundle an on-disk project, no network involved

use crate::project_files::{read_project_dir, write_document};
use anyhow::{Context, Result};
use colored::Colorize;
use loom_core::{build_preview, ProjectStore};
use std::path::Path;

pub async fn run(dir: &Path, out: Option<&Path>) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }
    let files = read_project_dir(dir).context("Failed to read project")?;
    let store = ProjectStore::from_files(files);
    let html = build_preview(store.project());

    match out {
        Some(path) => {
            write_document(path, &html)?;
            eprintln!(
                "{} Bundled {} file(s) into {}",
                "✓".green(),
                store.project().files.len(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", html),
    }
    Ok(())
}
