//! HTTP publish sink

use crate::transport_error;
use async_trait::async_trait;
use loom_core::{LoomError, PublishReceipt, PublishRequest, PublishSink, Result};
use tracing::{debug, info};

/// POSTs publish requests as JSON to a fixed endpoint
///
/// The endpoint answers with `{slug, url}`. A relative `url` is resolved
/// against the endpoint so callers always get something they can open.
pub struct HttpPublisher {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpPublisher {
    pub fn new(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    fn absolute_url(&self, url: &str) -> String {
        match reqwest::Url::parse(&self.endpoint).and_then(|base| base.join(url)) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => url.to_string(),
        }
    }
}

#[async_trait]
impl PublishSink for HttpPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt> {
        debug!(
            "Publishing {} ({} files) to {}",
            request.metadata.slug,
            request.files.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(LoomError::Publish(format!("{}: {}", status.as_u16(), body)));
        }

        let receipt: PublishReceipt = serde_json::from_str(&body)
            .map_err(|e| LoomError::MalformedResponse(format!("publish reply: {}", e)))?;
        let receipt = PublishReceipt {
            url: self.absolute_url(&receipt.url),
            ..receipt
        };
        info!("Publish endpoint accepted {}", receipt.slug);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client;
    use chrono::Utc;
    use loom_types::{File, PublishMetadata};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> PublishRequest {
        PublishRequest {
            metadata: PublishMetadata {
                slug: "demo-site".to_string(),
                title: "Demo".to_string(),
                ..PublishMetadata::default()
            },
            html: "<html></html>".to_string(),
            files: vec![File::new("index.html", "<html></html>")],
            published_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_posts_payload_and_resolves_relative_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/publish"))
            .and(body_partial_json(json!({
                "metadata": {"slug": "demo-site", "title": "Demo"},
                "html": "<html></html>",
                "files": [{"path": "index.html"}]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"slug": "demo-site", "url": "/demo-site"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let publisher = HttpPublisher::new(
            format!("{}/api/publish", server.uri()),
            http_client(Duration::from_secs(5)).unwrap(),
        );
        let receipt = publisher.publish(&request()).await.unwrap();
        assert_eq!(receipt.slug, "demo-site");
        assert_eq!(receipt.url, format!("{}/demo-site", server.uri()));
    }

    #[tokio::test]
    async fn test_rejection_is_publish_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("slug must be at least 2 characters"))
            .mount(&server)
            .await;

        let publisher = HttpPublisher::new(server.uri(), http_client(Duration::from_secs(5)).unwrap());
        let err = publisher.publish(&request()).await.unwrap_err();
        assert!(matches!(err, LoomError::Publish(_)));
        assert!(err.to_string().contains("400"));
    }
}
