//! Chat backend trait, adapter routing and provider resolution
//!
//! The orchestrator only ever sees a [`ChatBackend`] and a
//! [`ResolvedProvider`]. How a provider is chosen, where its key comes from
//! and which HTTP shape it speaks all live behind those two types.

use crate::error::{LoomError, Result};
use async_trait::async_trait;
use loom_types::{CloudConfig, ProviderKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Role of a message sent upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// One chat-completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Something that can answer a chat-completion call for any provider
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run the call and return the reply as plain text
    async fn complete(
        &self,
        provider: ProviderKind,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<String>;
}

/// One upstream API shape
///
/// Implementations normalise their reply to plain text and report non-2xx
/// responses as [`LoomError::ProviderHttp`].
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Providers this adapter answers for
    fn providers(&self) -> &[ProviderKind];

    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String>;
}

/// Routes calls to the adapter registered for each provider
#[derive(Default, Clone)]
pub struct AdapterRouter {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl AdapterRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter for every provider it declares
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        for provider in adapter.providers() {
            self.adapters.insert(*provider, Arc::clone(&adapter));
        }
    }

    pub fn has(&self, provider: ProviderKind) -> bool {
        self.adapters.contains_key(&provider)
    }

    pub fn registered_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::all()
            .iter()
            .copied()
            .filter(|p| self.has(*p))
            .collect()
    }
}

#[async_trait]
impl ChatBackend for AdapterRouter {
    async fn complete(
        &self,
        provider: ProviderKind,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<String> {
        let adapter = self
            .adapters
            .get(&provider)
            .ok_or_else(|| LoomError::UnsupportedProvider(provider.to_string()))?;
        debug!(
            "Calling {} model {} with {} messages",
            provider,
            request.model,
            request.messages.len()
        );
        adapter.complete(api_key, request).await
    }
}

/// Preset pairing of planning and content models for the built-in provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub planning_model: &'static str,
    pub content_model: &'static str,
}

pub const TIERS: &[Tier] = &[
    Tier {
        id: "fast",
        name: "Loom Fast",
        description: "Quick iterations, good for prototyping",
        planning_model: "grok-3-mini",
        content_model: "grok-code-fast-1",
    },
    Tier {
        id: "pro",
        name: "Loom Pro",
        description: "Balanced speed and quality",
        planning_model: "grok-4-fast-non-reasoning",
        content_model: "grok-code-fast-1",
    },
    Tier {
        id: "max",
        name: "Loom Max",
        description: "Deep reasoning for larger changes",
        planning_model: "grok-4-1-fast-reasoning",
        content_model: "grok-code-fast-1",
    },
];

pub const DEFAULT_TIER: &str = "pro";

/// Look up a tier, falling back to the first one for unknown ids
pub fn tier(id: &str) -> &'static Tier {
    TIERS.iter().find(|t| t.id == id).unwrap_or(&TIERS[0])
}

/// Environment variable holding the process-wide key for a provider
pub fn credential_env_var(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Builtin | ProviderKind::Grok => "XAI_API_KEY",
        ProviderKind::OpenAI => "OPENAI_API_KEY",
        ProviderKind::Claude => "ANTHROPIC_API_KEY",
    }
}

/// What the user picked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSelection {
    pub tier: String,
    pub cloud: Option<CloudConfig>,
    /// Preferred planning model for the built-in providers
    pub selected_model: Option<String>,
}

/// Concrete provider, key and model pair for one round
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub provider: ProviderKind,
    pub api_key: String,
    pub planning_model: String,
    pub content_model: String,
}

impl std::fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProvider")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("planning_model", &self.planning_model)
            .field("content_model", &self.content_model)
            .finish()
    }
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Turns a [`ProviderSelection`] into a [`ResolvedProvider`]
#[derive(Clone)]
pub struct ProviderResolver {
    env: EnvLookup,
}

impl Default for ProviderResolver {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ProviderResolver {
    /// Resolver that falls back to the process environment
    pub fn from_env() -> Self {
        Self::with_env(|name| std::env::var(name).ok())
    }

    /// Resolver with a custom environment lookup
    pub fn with_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            env: Arc::new(lookup),
        }
    }

    /// Resolve provider, key and models
    ///
    /// The key is the trimmed cloud key if present, else the provider's
    /// environment variable. A cloud model override wins for both roles.
    pub fn resolve(&self, selection: &ProviderSelection) -> Result<ResolvedProvider> {
        let cloud = selection.cloud.as_ref();
        let provider = cloud.map(|c| c.provider).unwrap_or_default();

        let env_var = credential_env_var(provider);
        let api_key = non_blank(cloud.and_then(|c| c.api_key.as_deref()))
            .or_else(|| non_blank((self.env)(env_var).as_deref()))
            .ok_or_else(|| LoomError::MissingCredential {
                provider: provider.display_name().to_string(),
                hint: env_var.to_string(),
            })?;

        let model_override = non_blank(cloud.and_then(|c| c.model.as_deref()));

        let (planning_model, content_model) = match provider {
            ProviderKind::Builtin | ProviderKind::Grok => {
                let tier = tier(&selection.tier);
                let planning = non_blank(selection.selected_model.as_deref())
                    .unwrap_or_else(|| tier.planning_model.to_string());
                (planning, tier.content_model.to_string())
            }
            ProviderKind::OpenAI => ("gpt-4.1-mini".to_string(), "gpt-4.1".to_string()),
            ProviderKind::Claude => (
                "claude-3-5-sonnet-latest".to_string(),
                "claude-3-5-sonnet-latest".to_string(),
            ),
        };

        let resolved = ResolvedProvider {
            provider,
            api_key,
            planning_model: model_override.clone().unwrap_or(planning_model),
            content_model: model_override.unwrap_or(content_model),
        };
        debug!("Resolved provider: {:?}", resolved);
        Ok(resolved)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
