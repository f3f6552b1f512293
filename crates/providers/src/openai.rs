use std::time::Duration;

use {async_trait::async_trait, secrecy::Secret};

use crate::{
    client::{ProviderClient, ProviderRequest},
    openai_compat,
    registry::ProviderId,
};

pub struct OpenAiClient {
    api_key: Secret<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: Secret<String>, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            api_key,
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    fn provider(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    async fn complete(&self, request: &ProviderRequest) -> anyhow::Result<String> {
        openai_compat::chat_completion(
            &self.client,
            &self.base_url,
            &self.api_key,
            "OpenAI",
            request,
        )
        .await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, mockito::Matcher};

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "gpt-4".into(),
            system: Some("You are a code-only assistant.".into()),
            prompt: "write a function".into(),
            max_tokens: 2000,
        }
    }

    fn client(base_url: String) -> OpenAiClient {
        OpenAiClient::new(
            Secret::new("test-key".to_string()),
            base_url,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_auth_and_returns_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4",
                "max_tokens": 2000,
                "messages": [
                    {"role": "system", "content": "You are a code-only assistant."},
                    {"role": "user", "content": "write a function"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"def f(): pass"}}],"usage":{"total_tokens":9}}"#)
            .create_async()
            .await;

        let text = client(server.url()).complete(&request()).await.unwrap();
        assert_eq!(text, "def f(): pass");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let err = client(server.url()).complete(&request()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("OpenAI API error HTTP 401"), "{msg}");
        assert!(msg.contains("Incorrect API key"), "{msg}");
    }

    #[tokio::test]
    async fn malformed_response_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client(server.url()).complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("no message content"));
    }
}
