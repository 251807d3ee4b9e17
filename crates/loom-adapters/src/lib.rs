//! HTTP adapters for Loom
//!
//! Concrete [`ProviderAdapter`]s for the chat-completion APIs Loom talks to,
//! plus the HTTP publish sink.

mod anthropic;
mod openai;
mod publish;

pub use anthropic::AnthropicAdapter;
pub use openai::OpenAiCompatibleAdapter;
pub use publish::HttpPublisher;

use loom_core::{AdapterRouter, LoomError, ProviderAdapter, Result};
use loom_types::ProviderKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const XAI_API_URL: &str = "https://api.x.ai/v1/chat/completions";
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Upstream URLs, overridable for self-hosted gateways and tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub xai: String,
    pub openai: String,
    pub anthropic: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            xai: XAI_API_URL.to_string(),
            openai: OPENAI_API_URL.to_string(),
            anthropic: ANTHROPIC_API_URL.to_string(),
        }
    }
}

/// Shared HTTP client for all adapters
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("loom/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LoomError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Router with every provider registered against `endpoints`
pub fn create_router(endpoints: &Endpoints, client: reqwest::Client) -> AdapterRouter {
    let mut router = AdapterRouter::new();
    // the xAI adapter also serves the built-in provider
    for provider in [ProviderKind::Grok, ProviderKind::OpenAI, ProviderKind::Claude] {
        router.register(Arc::from(get_adapter(provider, endpoints, client.clone())));
    }
    router
}

/// Adapter for a single provider
pub fn get_adapter(
    provider: ProviderKind,
    endpoints: &Endpoints,
    client: reqwest::Client,
) -> Box<dyn ProviderAdapter> {
    match provider {
        ProviderKind::Builtin | ProviderKind::Grok => Box::new(OpenAiCompatibleAdapter::new(
            "xAI",
            &[ProviderKind::Builtin, ProviderKind::Grok],
            endpoints.xai.clone(),
            client,
        )),
        ProviderKind::OpenAI => Box::new(OpenAiCompatibleAdapter::new(
            "OpenAI",
            &[ProviderKind::OpenAI],
            endpoints.openai.clone(),
            client,
        )),
        ProviderKind::Claude => Box::new(AnthropicAdapter::new(endpoints.anthropic.clone(), client)),
    }
}

fn transport_error(e: reqwest::Error) -> LoomError {
    if e.is_timeout() {
        LoomError::Transport(format!("request timed out: {}", e))
    } else {
        LoomError::Transport(e.to_string())
    }
}

/// Read a reply body, turning non-2xx statuses into [`LoomError::ProviderHttp`]
async fn read_success_body(provider: &str, response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    if !status.is_success() {
        return Err(LoomError::ProviderHttp {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::{ChatBackend, ChatMessage, CompletionRequest};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            temperature: 0.2,
            max_tokens: 100,
        }
    }

    #[tokio::test]
    async fn test_router_sends_each_provider_to_its_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xai"))
            .and(header("authorization", "Bearer xai-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "from xai"}}]
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/anthropic"))
            .and(header("x-api-key", "ant-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "from claude"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let endpoints = Endpoints {
            xai: format!("{}/xai", server.uri()),
            openai: format!("{}/openai", server.uri()),
            anthropic: format!("{}/anthropic", server.uri()),
        };
        let router = create_router(&endpoints, http_client(Duration::from_secs(5)).unwrap());

        let reply = router
            .complete(ProviderKind::Builtin, "xai-key", &request())
            .await
            .unwrap();
        assert_eq!(reply, "from xai");
        let reply = router
            .complete(ProviderKind::Grok, "xai-key", &request())
            .await
            .unwrap();
        assert_eq!(reply, "from xai");
        let reply = router
            .complete(ProviderKind::Claude, "ant-key", &request())
            .await
            .unwrap();
        assert_eq!(reply, "from claude");
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.xai, XAI_API_URL);
        assert!(endpoints.anthropic.ends_with("/v1/messages"));

        let client = http_client(Duration::from_secs(1)).unwrap();
        assert_eq!(
            get_adapter(ProviderKind::Builtin, &endpoints, client).providers(),
            &[ProviderKind::Builtin, ProviderKind::Grok]
        );
    }
}
