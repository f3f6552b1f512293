//! DeepSeek speaks the OpenAI chat completions protocol on its own host.

use std::time::Duration;

use {async_trait::async_trait, secrecy::Secret};

use crate::{
    client::{ProviderClient, ProviderRequest},
    openai_compat,
    registry::ProviderId,
};

pub struct DeepSeekClient {
    api_key: Secret<String>,
    base_url: String,
    client: reqwest::Client,
}

impl DeepSeekClient {
    pub fn new(api_key: Secret<String>, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            api_key,
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl ProviderClient for DeepSeekClient {
    fn provider(&self) -> ProviderId {
        ProviderId::DeepSeek
    }

    async fn complete(&self, request: &ProviderRequest) -> anyhow::Result<String> {
        openai_compat::chat_completion(
            &self.client,
            &self.base_url,
            &self.api_key,
            "DeepSeek",
            request,
        )
        .await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, mockito::Matcher};

    #[tokio::test]
    async fn completes_against_compatible_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer ds-key")
            .match_body(Matcher::PartialJson(
                serde_json::json!({"model": "deepseek-coder"}),
            ))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"fn main() {}"}}]}"#)
            .create_async()
            .await;

        let client = DeepSeekClient::new(
            Secret::new("ds-key".to_string()),
            server.url(),
            Duration::from_secs(5),
        )
        .unwrap();
        let text = client
            .complete(&ProviderRequest {
                model: "deepseek-coder".into(),
                system: None,
                prompt: "main".into(),
                max_tokens: 100,
            })
            .await
            .unwrap();
        assert_eq!(text, "fn main() {}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_names_deepseek() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = DeepSeekClient::new(
            Secret::new("ds-key".to_string()),
            server.url(),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client
            .complete(&ProviderRequest {
                model: "deepseek-chat".into(),
                system: None,
                prompt: "hi".into(),
                max_tokens: 10,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("DeepSeek API error HTTP 503"));
    }
}
