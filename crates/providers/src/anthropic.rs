use std::time::Duration;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, trace, warn},
};

use crate::{
    client::{ProviderClient, ProviderRequest},
    registry::ProviderId,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    api_key: Secret<String>,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: Secret<String>, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            api_key,
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

/// Build the Messages API body. The system prompt is a top-level field.
fn request_body(request: &ProviderRequest) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": request.model,
        "max_tokens": request.max_tokens,
        "messages": [{ "role": "user", "content": request.prompt }],
    });
    if let Some(system) = request.system.as_deref() {
        body["system"] = serde_json::Value::String(system.to_string());
    }
    body
}

/// Concatenate the `text` blocks of a Messages API response.
fn extract_text(resp: &serde_json::Value) -> Option<String> {
    resp["content"]
        .as_array()?
        .iter()
        .filter(|b| b["type"].as_str() == Some("text"))
        .filter_map(|b| b["text"].as_str())
        .map(str::to_string)
        .reduce(|a, b| a + &b)
        .filter(|s| !s.trim().is_empty())
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    fn provider(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn complete(&self, request: &ProviderRequest) -> anyhow::Result<String> {
        let body = request_body(request);

        debug!(
            model = %request.model,
            has_system = request.system.is_some(),
            max_tokens = request.max_tokens,
            "anthropic complete request"
        );
        trace!(body = %body, "anthropic request body");

        let http_resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = http_resp.status();
        if !status.is_success() {
            let body_text = http_resp.text().await.unwrap_or_default();
            warn!(status = %status, model = %request.model, "anthropic API error");
            anyhow::bail!("Anthropic API error HTTP {status}: {body_text}");
        }

        let resp = http_resp.json::<serde_json::Value>().await?;
        trace!(response = %resp, "anthropic raw response");

        extract_text(&resp).ok_or_else(|| anyhow::anyhow!("Anthropic response contained no text"))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, mockito::Matcher};

    fn client(base_url: String) -> AnthropicClient {
        AnthropicClient::new(
            Secret::new("sk-ant-test".to_string()),
            base_url,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "claude-3-5-sonnet-20240620".into(),
            system: Some("You are a helpful and friendly AI assistant.".into()),
            prompt: "hello".into(),
            max_tokens: 1000,
        }
    }

    #[test]
    fn system_is_top_level() {
        let body = request_body(&request());
        assert_eq!(body["system"], "You are a helpful and friendly AI assistant.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn extract_joins_text_blocks_and_skips_others() {
        let resp = serde_json::json!({
            "content": [
                {"type": "text", "text": "Hello, "},
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "world"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 5, "output_tokens": 2}
        });
        assert_eq!(extract_text(&resp).as_deref(), Some("Hello, world"));
    }

    #[test]
    fn extract_none_without_text() {
        assert!(extract_text(&serde_json::json!({"content": []})).is_none());
        assert!(extract_text(&serde_json::json!({})).is_none());
    }

    #[tokio::test]
    async fn sends_key_and_version_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "claude-3-5-sonnet-20240620",
                "max_tokens": 1000
            })))
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"Hi there"}]}"#)
            .create_async()
            .await;

        let text = client(server.url()).complete(&request()).await.unwrap();
        assert_eq!(text, "Hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_key_error_is_relayed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body(
                r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
            )
            .create_async()
            .await;

        let err = client(server.url()).complete(&request()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Anthropic API error HTTP 401"), "{msg}");
        assert!(msg.contains("invalid x-api-key"), "{msg}");
    }
}
