//! Generation orchestrator
//!
//! Runs one round per instruction:
//!
//! ```text
//! Idle -> Planning -> ParsingDirectives -> GeneratingFiles -> Applying -> Idle
//! ```
//!
//! Any provider failure or a cancellation ends the round early. Nothing is
//! applied to the store unless every content call succeeded, so a failed
//! round leaves the project exactly as it was.
//!
//! Content calls run one at a time in operation order. A `Modify` that
//! follows a `Create` of the same path in the same round sees the freshly
//! generated content as the existing file.

use crate::error::{LoomError, Result};
use crate::metrics::{MetricsRecorder, RoundOutcome};
use crate::parser::parse_plan;
use crate::preview::build_preview;
use crate::prompt::{
    content_messages, extract_file_content, planning_messages, PromptContext,
    CONTENT_MAX_TOKENS, CONTENT_TEMPERATURE, PLANNING_MAX_TOKENS, PLANNING_TEMPERATURE,
};
use crate::provider::{ChatBackend, CompletionRequest, ResolvedProvider};
use crate::store::ProjectStore;
use loom_types::{
    ChatTurn, CloudConfig, DesignConfig, GenerationMetrics, Operation, OperationKind, Project,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where a round currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Planning,
    ParsingDirectives,
    GeneratingFiles { completed: usize, total: usize },
    Applying,
}

/// How a round ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundStatus {
    Succeeded,
    Failed(String),
    Cancelled,
}

/// Summary of one finished round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub status: RoundStatus,
    /// Planning reply with directive blocks removed
    pub narrative: String,
    /// Short status line for the user
    pub message: String,
    /// Operations applied to the store, with generated content
    pub operations: Vec<Operation>,
    pub duration: Duration,
}

impl RoundReport {
    pub fn is_success(&self) -> bool {
        self.status == RoundStatus::Succeeded
    }
}

/// Notifications for observers of the orchestrator
#[derive(Debug, Clone)]
pub enum RoundEvent {
    Phase(RoundPhase),
    FileGenerated {
        path: String,
        completed: usize,
        total: usize,
    },
    Finished(RoundReport),
}

/// Per-round settings
#[derive(Debug, Clone)]
pub struct RoundOptions {
    pub provider: ResolvedProvider,
    pub plan_mode: bool,
    pub extended_thinking: bool,
    pub selected_model: Option<String>,
    pub design: Option<DesignConfig>,
    pub cloud: Option<CloudConfig>,
}

impl RoundOptions {
    pub fn new(provider: ResolvedProvider) -> Self {
        Self {
            provider,
            plan_mode: false,
            extended_thinking: false,
            selected_model: None,
            design: None,
            cloud: None,
        }
    }

    fn prompt_context(&self) -> PromptContext<'_> {
        PromptContext {
            plan_mode: self.plan_mode,
            extended_thinking: self.extended_thinking,
            selected_model: self.selected_model.as_deref(),
            design: self.design.as_ref(),
            cloud: self.cloud.as_ref(),
        }
    }
}

/// Status line for a successful round
pub fn status_message(operations: usize) -> String {
    match operations {
        0 => "No file changes were needed.".to_string(),
        1 => "Implemented 1 file update.".to_string(),
        n => format!("Implemented {} file updates.", n),
    }
}

/// Why a round stopped before applying
enum Halt {
    Cancelled,
    Failed(LoomError),
}

/// Clears the in-flight flag when the round ends, however it ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the project store, chat log and metrics, and runs generation rounds
pub struct Orchestrator {
    backend: Arc<dyn ChatBackend>,
    store: Arc<RwLock<ProjectStore>>,
    history: RwLock<Vec<ChatTurn>>,
    metrics: MetricsRecorder,
    in_flight: AtomicBool,
    cancel: RwLock<Option<CancellationToken>>,
    events: broadcast::Sender<RoundEvent>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self::with_store(backend, ProjectStore::new())
    }

    /// Start from an existing project
    pub fn with_store(backend: Arc<dyn ChatBackend>, store: ProjectStore) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            backend,
            store: Arc::new(RwLock::new(store)),
            history: RwLock::new(Vec::new()),
            metrics: MetricsRecorder::new(),
            in_flight: AtomicBool::new(false),
            cancel: RwLock::new(None),
            events,
        }
    }

    /// Shared handle to the project store
    pub fn store(&self) -> Arc<RwLock<ProjectStore>> {
        Arc::clone(&self.store)
    }

    pub async fn snapshot(&self) -> Project {
        self.store.read().await.snapshot()
    }

    pub async fn history(&self) -> Vec<ChatTurn> {
        self.history.read().await.clone()
    }

    pub async fn metrics(&self) -> GenerationMetrics {
        self.metrics.snapshot().await
    }

    /// Render the preview document for the current project
    pub async fn preview(&self) -> String {
        build_preview(self.store.read().await.project())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.events.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Cancel the in-flight round, if any
    ///
    /// Returns whether there was a round to cancel.
    pub async fn cancel(&self) -> bool {
        match self.cancel.read().await.as_ref() {
            Some(token) => {
                info!("Cancelling generation round");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Clear files, tabs, chat log and metrics
    pub async fn reset(&self) -> Result<()> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(LoomError::RoundInFlight)?;
        self.store.write().await.reset();
        self.history.write().await.clear();
        self.metrics.reset().await;
        info!("Project reset");
        Ok(())
    }

    /// Run one generation round for `instruction`
    ///
    /// Returns `Err` only when the round is rejected before it starts (empty
    /// instruction or another round in flight). Provider failures and
    /// cancellation come back as a [`RoundReport`] with the matching status.
    pub async fn send(&self, instruction: &str, options: &RoundOptions) -> Result<RoundReport> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(LoomError::EmptyInstruction);
        }
        // install the token before the round is visible as busy
        let token = CancellationToken::new();
        let _guard = {
            let mut slot = self.cancel.write().await;
            let guard =
                InFlightGuard::acquire(&self.in_flight).ok_or(LoomError::RoundInFlight)?;
            *slot = Some(token.clone());
            guard
        };
        let started = Instant::now();

        let prior = {
            let mut history = self.history.write().await;
            let prior = history.clone();
            history.push(ChatTurn::user(instruction));
            prior
        };
        let snapshot = self.snapshot().await;

        info!(
            "Round started with {} via {}",
            options.provider.planning_model, options.provider.provider
        );
        let result = self
            .run_round(instruction, options, &snapshot, &prior, &token)
            .await;
        *self.cancel.write().await = None;

        let report = match result {
            Ok((narrative, operations)) => {
                self.emit(RoundEvent::Phase(RoundPhase::Applying));
                self.store.write().await.apply_operations(&operations);

                let message = status_message(operations.len());
                let content = if narrative.is_empty() {
                    message.clone()
                } else {
                    narrative.clone()
                };
                self.history
                    .write()
                    .await
                    .push(ChatTurn::assistant(content).with_ops(operations.clone()));

                let duration = started.elapsed();
                self.metrics
                    .record(
                        RoundOutcome::Succeeded {
                            operations: operations.len(),
                        },
                        duration,
                    )
                    .await;
                info!("Round succeeded in {:?}: {}", duration, message);

                RoundReport {
                    status: RoundStatus::Succeeded,
                    narrative,
                    message,
                    operations,
                    duration,
                }
            }
            Err(Halt::Failed(e)) => {
                let message = e.to_string();
                warn!("Round failed: {}", message);
                self.history
                    .write()
                    .await
                    .push(ChatTurn::assistant(format!("Error: {}", message)));

                let duration = started.elapsed();
                self.metrics.record(RoundOutcome::Failed, duration).await;
                RoundReport {
                    status: RoundStatus::Failed(message.clone()),
                    narrative: String::new(),
                    message,
                    operations: Vec::new(),
                    duration,
                }
            }
            Err(Halt::Cancelled) => {
                let duration = started.elapsed();
                info!("Round cancelled after {:?}", duration);
                self.metrics.record(RoundOutcome::Cancelled, duration).await;
                RoundReport {
                    status: RoundStatus::Cancelled,
                    narrative: String::new(),
                    message: "Generation cancelled.".to_string(),
                    operations: Vec::new(),
                    duration,
                }
            }
        };

        self.emit(RoundEvent::Phase(RoundPhase::Idle));
        self.emit(RoundEvent::Finished(report.clone()));
        Ok(report)
    }

    async fn run_round(
        &self,
        instruction: &str,
        options: &RoundOptions,
        snapshot: &Project,
        prior: &[ChatTurn],
        token: &CancellationToken,
    ) -> std::result::Result<(String, Vec<Operation>), Halt> {
        let ctx = options.prompt_context();
        let provider = &options.provider;

        self.emit(RoundEvent::Phase(RoundPhase::Planning));
        let request = CompletionRequest {
            model: provider.planning_model.clone(),
            messages: planning_messages(&ctx, snapshot, prior, instruction),
            temperature: PLANNING_TEMPERATURE,
            max_tokens: PLANNING_MAX_TOKENS,
        };
        let reply = self.call(provider, request, token).await?;

        self.emit(RoundEvent::Phase(RoundPhase::ParsingDirectives));
        let plan = parse_plan(&reply);
        let total = plan.operations.iter().filter(|op| !op.is_delete()).count();
        debug!(
            "Plan has {} operations ({} need content)",
            plan.operations.len(),
            total
        );

        self.emit(RoundEvent::Phase(RoundPhase::GeneratingFiles {
            completed: 0,
            total,
        }));

        // content as of this point in the round; None marks a deleted path
        let mut overlay: HashMap<String, Option<String>> = HashMap::new();
        let mut completed = 0;
        let mut operations = Vec::with_capacity(plan.operations.len());

        for op in plan.operations {
            if op.is_delete() {
                overlay.insert(op.path.clone(), None);
                operations.push(op);
                continue;
            }

            let existing = match overlay.get(&op.path) {
                Some(current) => current.as_deref(),
                None => snapshot.file(&op.path).map(|f| f.content.as_str()),
            };

            let request = CompletionRequest {
                model: provider.content_model.clone(),
                messages: content_messages(&ctx, &op, existing),
                temperature: CONTENT_TEMPERATURE,
                max_tokens: CONTENT_MAX_TOKENS,
            };
            let content = extract_file_content(&self.call(provider, request, token).await?);

            completed += 1;
            self.emit(RoundEvent::FileGenerated {
                path: op.path.clone(),
                completed,
                total,
            });

            // an empty Modify keeps the previous content, as the store does
            let keeps_previous =
                op.kind == OperationKind::Modify && content.is_empty() && existing.is_some();
            if !keeps_previous {
                overlay.insert(op.path.clone(), Some(content.clone()));
            }
            operations.push(op.with_content(content));
        }

        Ok((plan.narrative, operations))
    }

    async fn call(
        &self,
        provider: &ResolvedProvider,
        request: CompletionRequest,
        token: &CancellationToken,
    ) -> std::result::Result<String, Halt> {
        debug!(
            "Provider call: {} model {} ({} messages)",
            provider.provider,
            request.model,
            request.messages.len()
        );
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Halt::Cancelled),
            reply = self.backend.complete(provider.provider, &provider.api_key, &request) => {
                reply.map_err(Halt::Failed)
            }
        }
    }

    fn emit(&self, event: RoundEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
