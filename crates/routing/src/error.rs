use modelgate_providers::ProviderId;

use crate::classify::{ProviderErrorKind, classify_error};

/// One failed provider call in an auto-mode request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub provider: ProviderId,
    pub model: String,
    pub message: String,
    pub kind: ProviderErrorKind,
}

impl FailedAttempt {
    pub(crate) fn new(provider: ProviderId, model: &str, message: String) -> Self {
        Self {
            kind: classify_error(&message),
            provider,
            model: model.to_string(),
            message,
        }
    }
}

/// Why an auto-mode request found no provider to serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exhausted {
    /// No provider in the priority list has a credential.
    NoCredentials { missing: Vec<ProviderId> },
    /// Every credentialed provider was tried and failed.
    AllFailed {
        attempts: Vec<FailedAttempt>,
        last_error: String,
    },
}

impl std::fmt::Display for Exhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCredentials { missing } => {
                let vars: Vec<&str> = missing.iter().map(|p| p.env_key()).collect();
                write!(
                    f,
                    "The requested AI model is not available. Set {} to enable a provider.",
                    vars.join(", ")
                )
            },
            Self::AllFailed {
                attempts,
                last_error,
            } => write!(
                f,
                "all {} provider attempts failed, last error: {last_error}",
                attempts.len()
            ),
        }
    }
}

/// Terminal failure of a routed request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The payload is missing its content or prompt. Nothing was attempted.
    #[error("{0}")]
    InvalidRequest(&'static str),

    /// A pinned model's provider has no credential.
    #[error(
        "The requested model {model} is not available. Set {} to enable {}.",
        provider.env_key(),
        provider.display_name()
    )]
    ProviderUnavailable { model: String, provider: ProviderId },

    /// A pinned model's provider call failed; the raw provider message.
    #[error("{message}")]
    ProviderCallFailed {
        provider: ProviderId,
        model: String,
        message: String,
    },

    #[error("{0}")]
    AllProvidersExhausted(Exhausted),
}

impl RouteError {
    /// Value reported in the `model` field of an error body: `"mock"` when no
    /// provider was called, `"error"` when calls were made and failed.
    #[must_use]
    pub fn model_sentinel(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_)
            | Self::ProviderUnavailable { .. }
            | Self::AllProvidersExhausted(Exhausted::NoCredentials { .. }) => "mock",
            Self::ProviderCallFailed { .. }
            | Self::AllProvidersExhausted(Exhausted::AllFailed { .. }) => "error",
        }
    }

    /// The last provider error text, when a provider was actually called.
    #[must_use]
    pub fn raw_message(&self) -> Option<&str> {
        match self {
            Self::ProviderCallFailed { message, .. } => Some(message),
            Self::AllProvidersExhausted(Exhausted::AllFailed { last_error, .. }) => {
                Some(last_error)
            },
            _ => None,
        }
    }

    /// Classification of the last provider error, if any.
    #[must_use]
    pub fn error_kind(&self) -> Option<ProviderErrorKind> {
        self.raw_message().map(classify_error)
    }

    /// Whether the provider rejected the configured credential.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        self.error_kind() == Some(ProviderErrorKind::AuthError)
    }
}
