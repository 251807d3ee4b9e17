//! Anthropic messages API

use crate::{read_success_body, transport_error};
use async_trait::async_trait;
use loom_core::{CompletionRequest, LoomError, MessageRole, ProviderAdapter, Result};
use loom_types::ProviderKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: [TextBlock<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Adapter for `POST /v1/messages`
///
/// The system prompt travels separately from the conversation, and each
/// message is sent as a single text block.
pub struct AnthropicAdapter {
    url: String,
    client: reqwest::Client,
}

impl AnthropicAdapter {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

fn to_messages_request(request: &CompletionRequest) -> MessagesRequest<'_> {
    let system = request
        .messages
        .iter()
        .find(|m| m.role == MessageRole::System)
        .map(|m| m.content.clone())
        .unwrap_or_default();

    let messages = request
        .messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| Message {
            role: match m.role {
                MessageRole::Assistant => "assistant",
                _ => "user",
            },
            content: [TextBlock {
                kind: "text",
                text: &m.content,
            }],
        })
        .collect();

    MessagesRequest {
        model: &request.model,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        system,
        messages,
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn providers(&self) -> &[ProviderKind] {
        &[ProviderKind::Claude]
    }

    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String> {
        let body = to_messages_request(request);

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let text = read_success_body("Claude", response).await?;
        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| LoomError::MalformedResponse(format!("Claude reply: {}", e)))?;

        let reply = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
        debug!("Claude replied with {} bytes", reply.len());
        Ok(reply)
    }
}
