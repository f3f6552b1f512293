//! Static table of known models, grouped by provider.
//!
//! The registry is built once at startup and never mutated. Model ids are
//! opaque tokens forwarded to the provider API as-is; lookups are exact.

use std::{collections::HashMap, fmt, str::FromStr};

use {modelgate_config::ProvidersConfig, serde::Serialize};

/// A third-party LLM vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    DeepSeek,
}

impl ProviderId {
    /// Every provider, in the default auto-mode priority order.
    pub const ALL: [ProviderId; 3] = [Self::OpenAi, Self::Anthropic, Self::DeepSeek];

    /// Config/wire name (`"openai"`, `"anthropic"`, `"deepseek"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::DeepSeek => "deepseek",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::DeepSeek => "DeepSeek",
        }
    }

    /// Environment variable holding the provider's API key.
    #[must_use]
    pub const fn env_key(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    /// Environment variable overriding the API base URL.
    #[must_use]
    pub const fn env_base_url_key(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_BASE_URL",
            Self::Anthropic => "ANTHROPIC_BASE_URL",
            Self::DeepSeek => "DEEPSEEK_BASE_URL",
        }
    }

    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::DeepSeek => "https://api.deepseek.com",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider \"{0}\"")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// What kind of request a model is declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Chat,
    Code,
}

impl Capability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Code => "code",
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "code" => Ok(Self::Code),
            other => Err(format!("unknown capability \"{other}\"")),
        }
    }
}

/// A model the gateway knows how to route to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub provider: ProviderId,
    pub capability: Capability,
}

impl ModelDescriptor {
    /// Chat models also write code; code models are not offered for chat.
    #[must_use]
    pub fn supports(&self, requested: Capability) -> bool {
        self.capability == requested || self.capability == Capability::Chat
    }
}

const fn model(
    provider: ProviderId,
    id: &'static str,
    display_name: &'static str,
    capability: Capability,
) -> ModelDescriptor {
    ModelDescriptor {
        id,
        display_name,
        provider,
        capability,
    }
}

/// Built-in model table, in declaration order.
const BUILTIN_MODELS: &[ModelDescriptor] = &[
    model(ProviderId::OpenAi, "gpt-4", "GPT-4", Capability::Chat),
    model(ProviderId::OpenAi, "gpt-4-turbo", "GPT-4 Turbo", Capability::Chat),
    model(ProviderId::OpenAi, "gpt-3.5-turbo", "GPT-3.5 Turbo", Capability::Chat),
    model(
        ProviderId::Anthropic,
        "claude-3-sonnet-20240229",
        "Claude 3 Sonnet",
        Capability::Chat,
    ),
    model(
        ProviderId::Anthropic,
        "claude-3-5-sonnet-20240620",
        "Claude 3.5 Sonnet",
        Capability::Chat,
    ),
    model(ProviderId::DeepSeek, "deepseek-chat", "DeepSeek Chat", Capability::Chat),
    model(ProviderId::DeepSeek, "deepseek-coder", "DeepSeek Coder", Capability::Code),
];

/// Declared default per provider, used when a request does not pin a model.
const fn builtin_default(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::OpenAi => "gpt-4",
        ProviderId::Anthropic => "claude-3-5-sonnet-20240620",
        ProviderId::DeepSeek => "deepseek-chat",
    }
}

/// Read-only model registry.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    models: Vec<ModelDescriptor>,
    default_overrides: HashMap<ProviderId, String>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderRegistry {
    /// The built-in model table with declared defaults.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            models: BUILTIN_MODELS.to_vec(),
            default_overrides: HashMap::new(),
        }
    }

    /// Built-in table with `[providers.<name>] model = "..."` overrides applied
    /// to the per-provider defaults.
    #[must_use]
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut registry = Self::builtin();
        for provider in ProviderId::ALL {
            if let Some(model) = config
                .get(provider.as_str())
                .and_then(|e| e.model.as_deref())
                .filter(|m| !m.is_empty())
            {
                registry
                    .default_overrides
                    .insert(provider, model.to_string());
            }
        }
        registry
    }

    /// Models usable for `capability`, in declaration order.
    pub fn list_models(&self, capability: Capability) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(move |m| m.supports(capability))
    }

    /// Models declared for one provider, in declaration order.
    pub fn models_for(&self, provider: ProviderId) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(move |m| m.provider == provider)
    }

    /// Exact-match lookup. No case folding, no prefix matching.
    #[must_use]
    pub fn resolve(&self, requested_id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == requested_id)
    }

    /// Model id to use when `provider` is picked in auto mode.
    ///
    /// A configured override wins. Otherwise code requests prefer a model the
    /// provider declares specifically for code, and everything else gets the
    /// provider's declared default.
    #[must_use]
    pub fn default_model(&self, provider: ProviderId, capability: Capability) -> &str {
        if let Some(model) = self.default_overrides.get(&provider) {
            return model;
        }
        if capability == Capability::Code
            && let Some(code_model) = self
                .models_for(provider)
                .find(|m| m.capability == Capability::Code)
        {
            return code_model.id;
        }
        builtin_default(provider)
    }
}
