//! CLI commands

pub mod chat;
pub mod config;
pub mod generate;
pub mod preview;
pub mod publish;

use crate::config::Settings;
use crate::ui;
use anyhow::{Context, Result};
use loom_adapters::{create_router, http_client};
use loom_core::{Orchestrator, ProjectStore, ProviderResolver, RoundOptions, RoundReport};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Build an orchestrator wired to the configured provider
pub(crate) fn open_session(
    settings: &Settings,
    store: ProjectStore,
) -> Result<(Arc<Orchestrator>, RoundOptions)> {
    let resolved = ProviderResolver::from_env().resolve(&settings.selection())?;
    debug!("Using {:?}", resolved);

    let client = http_client(Duration::from_secs(settings.request_timeout_secs))
        .context("Failed to set up HTTP client")?;
    let router = create_router(&settings.endpoints, client);
    let orchestrator = Orchestrator::with_store(Arc::new(router), store);

    Ok((Arc::new(orchestrator), settings.round_options(resolved)))
}

/// Run one round with a spinner; Ctrl-C cancels it
pub(crate) async fn run_round(
    orchestrator: &Orchestrator,
    instruction: &str,
    options: &RoundOptions,
) -> Result<RoundReport> {
    let progress = ui::spawn_progress(orchestrator.subscribe());

    let round = orchestrator.send(instruction, options);
    tokio::pin!(round);
    let result = tokio::select! {
        result = &mut round => result,
        _ = tokio::signal::ctrl_c() => {
            orchestrator.cancel().await;
            round.await
        }
    };

    match result {
        Ok(report) => {
            let _ = progress.await;
            Ok(report)
        }
        Err(e) => {
            progress.abort();
            Err(e.into())
        }
    }
}
