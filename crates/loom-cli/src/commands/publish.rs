//! Publish command - hand a project to the publish endpoint

use crate::config::{Settings, SettingsManager};
use crate::project_files::read_project_dir;
use anyhow::{Context, Result};
use colored::Colorize;
use loom_adapters::{http_client, HttpPublisher};
use loom_core::{publish_project, ProjectStore, PublishReceipt};
use loom_types::{Project, PublishMetadata};
use std::path::Path;
use std::time::Duration;

/// Publish `project` using the endpoint from `settings`
pub async fn publish(
    settings: &Settings,
    project: &Project,
    metadata: &PublishMetadata,
) -> Result<PublishReceipt> {
    let endpoint = settings
        .publish_url
        .as_deref()
        .context("No publish endpoint configured. Run `loom config set-publish-url <url>` first.")?;

    let client = http_client(Duration::from_secs(settings.request_timeout_secs))?;
    let sink = HttpPublisher::new(endpoint, client);
    Ok(publish_project(&sink, project, metadata).await?)
}

pub fn print_receipt(receipt: &PublishReceipt) {
    println!(
        "{} Published as {}: {}",
        "✓".green(),
        receipt.slug.cyan(),
        receipt.url.underline()
    );
}

/// Publish a project directory
pub async fn run(dir: &Path, metadata: PublishMetadata) -> Result<()> {
    let settings = SettingsManager::load().context("Failed to load settings")?;
    let files = read_project_dir(dir).context("Failed to read project")?;
    let project = ProjectStore::from_files(files).snapshot();
    if project.is_empty() {
        anyhow::bail!("No files found in {}", dir.display());
    }

    let receipt = publish(&settings, &project, &metadata).await?;
    print_receipt(&receipt);
    Ok(())
}
