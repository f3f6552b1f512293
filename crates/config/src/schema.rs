//! Config schema types (server, routing, providers, metrics).
use std::collections::HashMap;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Provider names understood by the gateway, in default priority order.
pub const KNOWN_PROVIDER_NAMES: &[&str] = &["openai", "anthropic", "deepseek"];

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelgateConfig {
    pub server: ServerConfig,
    pub routing: RoutingConfig,
    pub providers: ProvidersConfig,
    pub metrics: MetricsConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on. Defaults to 8888, the port `netlify dev` serves
    /// functions on, so existing front-ends keep working unchanged.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8888,
        }
    }
}

/// Fallback routing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Provider order tried for `/chat` requests in auto mode.
    pub chat_order: Vec<String>,
    /// Provider order tried for `/code-generate` requests in auto mode.
    pub code_order: Vec<String>,
    /// Upper bound for a single provider call, in seconds.
    pub attempt_timeout_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let order: Vec<String> = KNOWN_PROVIDER_NAMES.iter().map(|s| s.to_string()).collect();
        Self {
            chat_order: order.clone(),
            code_order: order,
            attempt_timeout_secs: 30,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether the Prometheus recorder is installed at startup.
    pub enabled: bool,
}

/// Per-provider settings keyed by provider name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Known keys: "openai", "anthropic", "deepseek"
    #[serde(flatten)]
    pub providers: HashMap<String, ProviderEntry>,
}

/// Configuration for a single LLM provider.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEntry {
    /// Whether this provider is enabled. Defaults to true.
    pub enabled: bool,

    /// API key used when the provider's environment variable is unset.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<Secret<String>>,

    /// Override the base URL.
    pub base_url: Option<String>,

    /// Default model ID for this provider in auto mode.
    pub model: Option<String>,
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl Default for ProviderEntry {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
            model: None,
        }
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

impl ProvidersConfig {
    /// Check if a provider is enabled (defaults to true if not configured).
    pub fn is_enabled(&self, name: &str) -> bool {
        self.providers.get(name).is_none_or(|e| e.enabled)
    }

    /// Get the configured entry for a provider, if any.
    pub fn get(&self, name: &str) -> Option<&ProviderEntry> {
        self.providers.get(name)
    }
}
