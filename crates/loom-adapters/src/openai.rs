//! OpenAI-style chat completions (xAI and OpenAI)

use crate::{read_success_body, transport_error};
use async_trait::async_trait;
use loom_core::{ChatMessage, CompletionRequest, LoomError, ProviderAdapter, Result};
use loom_types::ProviderKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ReplyMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Adapter for any endpoint speaking the `/chat/completions` shape
pub struct OpenAiCompatibleAdapter {
    name: &'static str,
    providers: Vec<ProviderKind>,
    url: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleAdapter {
    pub fn new(
        name: &'static str,
        providers: &[ProviderKind],
        url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name,
            providers: providers.to_vec(),
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn providers(&self) -> &[ProviderKind] {
        &self.providers
    }

    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let text = read_success_body(self.name, response).await?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| LoomError::MalformedResponse(format!("{} reply: {}", self.name, e)))?;

        // a reply without choices is an empty answer, not an error
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();
        debug!("{} replied with {} bytes", self.name, content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> OpenAiCompatibleAdapter {
        OpenAiCompatibleAdapter::new(
            "OpenAI",
            &[ProviderKind::OpenAI],
            format!("{}/v1/chat/completions", server.uri()),
            http_client(Duration::from_secs(5)).unwrap(),
        )
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4.1".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hello")],
            temperature: 0.45,
            max_tokens: 4000,
        }
    }

    #[tokio::test]
    async fn test_sends_chat_completion_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4.1",
                "max_tokens": 4000,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "Hi there"}},
                    {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = adapter(&server).complete("sk-test", &request()).await.unwrap();
        assert_eq!(reply, "Hi there");
    }

    #[tokio::test]
    async fn test_missing_choices_is_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let reply = adapter(&server).complete("k", &request()).await.unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_non_success_status_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = adapter(&server).complete("k", &request()).await.unwrap_err();
        match &err {
            LoomError::ProviderHttp {
                provider,
                status,
                body,
            } => {
                assert_eq!(provider, "OpenAI");
                assert_eq!(*status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "OpenAI error (429): rate limited");
        assert!(err.is_provider_failure());
    }

    #[tokio::test]
    async fn test_garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = adapter(&server).complete("k", &request()).await.unwrap_err();
        assert!(matches!(err, LoomError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let adapter = OpenAiCompatibleAdapter::new(
            "xAI",
            &[ProviderKind::Grok],
            "http://127.0.0.1:9/v1/chat/completions",
            http_client(Duration::from_secs(2)).unwrap(),
        );
        let err = adapter.complete("k", &request()).await.unwrap_err();
        assert!(matches!(err, LoomError::Transport(_)));
    }
}
