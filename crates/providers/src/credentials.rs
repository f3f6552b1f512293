//! API key discovery.
//!
//! Keys are read once at startup and kept wrapped in `Secret<String>` so they
//! never end up in logs or responses. Only their presence matters to routing.

use std::collections::HashMap;

use {
    modelgate_config::{ProvidersConfig, has_unresolved_placeholder},
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
};

use crate::registry::ProviderId;

/// Per-provider API keys resolved at startup.
#[derive(Default, Clone)]
pub struct Credentials {
    keys: HashMap<ProviderId, Secret<String>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("configured", &self.configured())
            .finish()
    }
}

impl Credentials {
    /// Resolve keys from the process environment, falling back to config.
    #[must_use]
    pub fn from_env_with_config(config: &ProvidersConfig) -> Self {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Resolve keys through a custom environment lookup.
    ///
    /// The environment variable wins over `[providers.<name>] api_key`. Empty
    /// values and config keys left as an unresolved `${VAR}` count as absent,
    /// and a provider disabled in config never gets a credential.
    pub fn from_lookup(config: &ProvidersConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut keys = HashMap::new();
        for provider in ProviderId::ALL {
            if !config.is_enabled(provider.as_str()) {
                continue;
            }
            let key = lookup(provider.env_key())
                .filter(|k| !k.trim().is_empty())
                .map(Secret::new)
                .or_else(|| {
                    config
                        .get(provider.as_str())
                        .and_then(|e| e.api_key.clone())
                        .filter(|k| {
                            let unresolved = has_unresolved_placeholder(k.expose_secret());
                            if unresolved {
                                debug!(%provider, "config api_key is an unresolved placeholder, ignoring");
                            }
                            !unresolved
                        })
                })
                .filter(|s| !s.expose_secret().trim().is_empty());
            if let Some(key) = key {
                keys.insert(provider, key);
            }
        }
        Self { keys }
    }

    /// Credentials for exactly the given providers (tests, one-shot tools).
    #[must_use]
    pub fn with_keys(keys: impl IntoIterator<Item = (ProviderId, String)>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|(provider, key)| (provider, Secret::new(key)))
                .collect(),
        }
    }

    #[must_use]
    pub fn has(&self, provider: ProviderId) -> bool {
        self.keys.contains_key(&provider)
    }

    #[must_use]
    pub fn get(&self, provider: ProviderId) -> Option<&Secret<String>> {
        self.keys.get(&provider)
    }

    /// Providers with a key, in default priority order.
    #[must_use]
    pub fn configured(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|p| self.has(*p))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, modelgate_config::ProviderEntry};

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn reads_only_present_keys() {
        let creds = Credentials::from_lookup(
            &ProvidersConfig::default(),
            env(&[("OPENAI_API_KEY", "sk-test")]),
        );
        assert!(creds.has(ProviderId::OpenAi));
        assert!(!creds.has(ProviderId::Anthropic));
        assert_eq!(creds.configured(), vec![ProviderId::OpenAi]);
    }

    #[test]
    fn empty_value_counts_as_absent() {
        let creds = Credentials::from_lookup(
            &ProvidersConfig::default(),
            env(&[("ANTHROPIC_API_KEY", "  ")]),
        );
        assert!(creds.is_empty());
    }

    #[test]
    fn config_key_used_when_env_missing() {
        let mut config = ProvidersConfig::default();
        config.providers.insert("deepseek".into(), ProviderEntry {
            api_key: Some(Secret::new("ds-from-config".into())),
            ..Default::default()
        });
        let creds = Credentials::from_lookup(&config, env(&[]));
        assert_eq!(
            creds.get(ProviderId::DeepSeek).unwrap().expose_secret(),
            "ds-from-config"
        );
    }

    #[test]
    fn env_wins_over_config() {
        let mut config = ProvidersConfig::default();
        config.providers.insert("openai".into(), ProviderEntry {
            api_key: Some(Secret::new("from-config".into())),
            ..Default::default()
        });
        let creds = Credentials::from_lookup(&config, env(&[("OPENAI_API_KEY", "from-env")]));
        assert_eq!(
            creds.get(ProviderId::OpenAi).unwrap().expose_secret(),
            "from-env"
        );
    }

    #[test]
    fn unset_placeholder_in_config_is_not_a_credential() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modelgate.toml");
        std::fs::write(
            &path,
            "[providers.openai]\nenabled = true\napi_key = \"${MODELGATE_TEST_UNSET_OPENAI_KEY}\"\n",
        )
        .unwrap();
        let config = modelgate_config::load_config(&path).unwrap();

        let creds = Credentials::from_lookup(&config.providers, env(&[]));
        assert!(!creds.has(ProviderId::OpenAi));
        assert!(creds.is_empty());
    }

    #[test]
    fn disabled_provider_has_no_credential() {
        let mut config = ProvidersConfig::default();
        config.providers.insert("openai".into(), ProviderEntry {
            enabled: false,
            ..Default::default()
        });
        let creds = Credentials::from_lookup(&config, env(&[("OPENAI_API_KEY", "sk-test")]));
        assert!(!creds.has(ProviderId::OpenAi));
    }

    #[test]
    fn debug_never_prints_keys() {
        let creds = Credentials::with_keys([(ProviderId::Anthropic, "sk-ant-secret".into())]);
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("sk-ant-secret"));
        assert!(dbg.contains("Anthropic"));
    }
}
