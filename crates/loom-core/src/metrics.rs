//! Generation round metrics
//!
//! Updated exactly once per finished round by the orchestrator.

use chrono::Utc;
use loom_types::GenerationMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// How a round ended, as far as metrics are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Succeeded { operations: usize },
    Failed,
    Cancelled,
}

/// Shared accumulator for [`GenerationMetrics`]
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder {
    inner: Arc<RwLock<GenerationMetrics>>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished round
    ///
    /// The rolling average only covers successful rounds; failures and
    /// cancellations update the last-round latency but leave it alone.
    pub async fn record(&self, outcome: RoundOutcome, elapsed: Duration) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        let mut m = self.inner.write().await;

        m.generation_count += 1;
        m.last_generation_ms = ms;
        m.last_generated_at = Some(Utc::now());

        match outcome {
            RoundOutcome::Succeeded { operations } => {
                m.success_count += 1;
                m.total_operations += operations as u64;
                let n = m.success_count as f64;
                m.avg_generation_ms += (ms - m.avg_generation_ms) / n;
            }
            RoundOutcome::Failed => {
                m.failed_count += 1;
            }
            RoundOutcome::Cancelled => {
                m.failed_count += 1;
                m.cancelled_count += 1;
            }
        }

        debug!(
            "Round recorded: {:?} in {:.0}ms ({} total, {} failed)",
            outcome, ms, m.generation_count, m.failed_count
        );
    }

    pub async fn snapshot(&self) -> GenerationMetrics {
        self.inner.read().await.clone()
    }

    pub async fn reset(&self) {
        *self.inner.write().await = GenerationMetrics::default();
    }
}
