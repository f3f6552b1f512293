use std::{collections::BTreeMap, sync::Arc, time::Duration};

use {async_trait::async_trait, modelgate_config::ProvidersConfig, tracing::debug};

use crate::{
    anthropic::AnthropicClient, credentials::Credentials, deepseek::DeepSeekClient,
    openai::OpenAiClient, registry::ProviderId,
};

/// A single-turn completion request, already shaped for a provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    /// Model id forwarded verbatim to the provider.
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
}

/// One LLM vendor's completion endpoint.
///
/// Implementations issue exactly one HTTP call per `complete` and return the
/// reply as plain text; usage and finish metadata are dropped.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> ProviderId;

    async fn complete(&self, request: &ProviderRequest) -> anyhow::Result<String>;
}

/// Clients for every credentialed provider, keyed by provider id.
///
/// A provider without a credential has no entry, so "has a client" and
/// "may be attempted" are the same question.
#[derive(Clone, Default)]
pub struct ProviderClients {
    clients: BTreeMap<ProviderId, Arc<dyn ProviderClient>>,
}

impl std::fmt::Debug for ProviderClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.clients.keys()).finish()
    }
}

impl ProviderClients {
    /// Build HTTP clients for each provider in `credentials`.
    ///
    /// Base URLs come from `[providers.<name>] base_url`, then the
    /// provider's `*_BASE_URL` environment variable, then the public default.
    pub fn from_credentials(
        credentials: &Credentials,
        config: &ProvidersConfig,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Self::from_credentials_with_lookup(credentials, config, timeout, |name| {
            std::env::var(name).ok()
        })
    }

    pub fn from_credentials_with_lookup(
        credentials: &Credentials,
        config: &ProvidersConfig,
        timeout: Duration,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let mut clients = Self::default();
        for provider in credentials.configured() {
            let Some(api_key) = credentials.get(provider).cloned() else {
                continue;
            };
            let base_url = config
                .get(provider.as_str())
                .and_then(|e| e.base_url.clone())
                .or_else(|| lookup(provider.env_base_url_key()))
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| provider.default_base_url().to_string());
            let base_url = base_url.trim_end_matches('/').to_string();
            debug!(provider = %provider, base_url = %base_url, "registering provider client");

            let client: Arc<dyn ProviderClient> = match provider {
                ProviderId::OpenAi => Arc::new(OpenAiClient::new(api_key, base_url, timeout)?),
                ProviderId::Anthropic => {
                    Arc::new(AnthropicClient::new(api_key, base_url, timeout)?)
                },
                ProviderId::DeepSeek => Arc::new(DeepSeekClient::new(api_key, base_url, timeout)?),
            };
            clients.insert(client);
        }
        Ok(clients)
    }

    /// Register a client, replacing any existing one for the same provider.
    pub fn insert(&mut self, client: Arc<dyn ProviderClient>) {
        self.clients.insert(client.provider(), client);
    }

    #[must_use]
    pub fn get(&self, provider: ProviderId) -> Option<&Arc<dyn ProviderClient>> {
        self.clients.get(&provider)
    }

    #[must_use]
    pub fn is_configured(&self, provider: ProviderId) -> bool {
        self.clients.contains_key(&provider)
    }

    /// Providers with a client, in default priority order.
    #[must_use]
    pub fn configured(&self) -> Vec<ProviderId> {
        self.clients.keys().copied().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, modelgate_config::ProviderEntry};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn builds_one_client_per_credential() {
        let creds = Credentials::with_keys([
            (ProviderId::DeepSeek, "ds".to_string()),
            (ProviderId::OpenAi, "sk".to_string()),
        ]);
        let clients = ProviderClients::from_credentials_with_lookup(
            &creds,
            &ProvidersConfig::default(),
            Duration::from_secs(5),
            no_env,
        )
        .unwrap();
        assert_eq!(clients.configured(), vec![
            ProviderId::OpenAi,
            ProviderId::DeepSeek
        ]);
        assert!(!clients.is_configured(ProviderId::Anthropic));
        assert_eq!(
            clients.get(ProviderId::DeepSeek).unwrap().provider(),
            ProviderId::DeepSeek
        );
    }

    #[test]
    fn no_credentials_no_clients() {
        let clients = ProviderClients::from_credentials_with_lookup(
            &Credentials::default(),
            &ProvidersConfig::default(),
            Duration::from_secs(5),
            no_env,
        )
        .unwrap();
        assert!(clients.is_empty());
    }

    #[tokio::test]
    async fn config_base_url_is_used() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"hi"}}]}"#)
            .create_async()
            .await;

        let mut config = ProvidersConfig::default();
        config.providers.insert("openai".into(), ProviderEntry {
            base_url: Some(format!("{}/", server.url())),
            ..Default::default()
        });
        let creds = Credentials::with_keys([(ProviderId::OpenAi, "sk".to_string())]);
        let clients = ProviderClients::from_credentials_with_lookup(
            &creds,
            &config,
            Duration::from_secs(5),
            no_env,
        )
        .unwrap();

        let text = clients
            .get(ProviderId::OpenAi)
            .unwrap()
            .complete(&ProviderRequest {
                model: "gpt-4".into(),
                system: None,
                prompt: "hello".into(),
                max_tokens: 10,
            })
            .await
            .unwrap();
        assert_eq!(text, "hi");
        mock.assert_async().await;
    }
}
