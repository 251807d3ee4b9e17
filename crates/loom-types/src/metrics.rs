//! Generation round counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters accumulated across generation rounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetrics {
    pub generation_count: u64,
    pub success_count: u64,
    pub failed_count: u64,
    /// Subset of `failed_count` that ended by cancellation
    pub cancelled_count: u64,
    pub total_operations: u64,
    /// Mean latency of successful rounds
    pub avg_generation_ms: f64,
    pub last_generation_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_generated_at: Option<DateTime<Utc>>,
}
