//! Classify provider failures from their error text.
//!
//! Classification never changes routing (every failure falls through in auto
//! mode and is fatal when pinned). It labels logs and metrics, and decides
//! whether the gateway reports a failure as a credential problem.

/// Coarse kind of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// 429 or an explicit rate limit message.
    RateLimit,
    /// Rejected or missing API key.
    AuthError,
    /// Quota or billing exhausted.
    BillingExhausted,
    /// 5xx or an overloaded provider.
    ServerError,
    /// The attempt exceeded its time budget.
    Timeout,
    /// 400-level request problems.
    InvalidRequest,
    /// Connection resets, DNS failures, anything else.
    Unknown,
}

impl ProviderErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::AuthError => "auth",
            Self::BillingExhausted => "billing",
            Self::ServerError => "server",
            Self::Timeout => "timeout",
            Self::InvalidRequest => "invalid_request",
            Self::Unknown => "unknown",
        }
    }
}

const AUTH_PHRASES: &[&str] = &[
    "api key",
    "api_key",
    "api-key",
    "unauthorized",
    "authentication",
];

/// Whether `msg` carries `code` as a standalone token.
///
/// Status codes are only recognized between non-alphanumeric characters, so
/// request ids and hashes in response bodies never match.
fn has_status(msg: &str, code: &str) -> bool {
    msg.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token == code)
}

/// Classify an error message into a [`ProviderErrorKind`].
#[must_use]
pub fn classify_error(message: &str) -> ProviderErrorKind {
    let msg = message.to_lowercase();

    // Auth first: "invalid api key" bodies often arrive with other codes.
    if has_status(&msg, "401") || AUTH_PHRASES.iter().any(|p| msg.contains(p)) {
        return ProviderErrorKind::AuthError;
    }

    if has_status(&msg, "429")
        || msg.contains("rate limit")
        || msg.contains("rate_limit")
        || msg.contains("too many requests")
    {
        return ProviderErrorKind::RateLimit;
    }

    if msg.contains("billing") || msg.contains("quota") || msg.contains("credit") {
        return ProviderErrorKind::BillingExhausted;
    }

    if msg.contains("timed out") || msg.contains("timeout") {
        return ProviderErrorKind::Timeout;
    }

    if ["500", "502", "503", "504", "529"]
        .iter()
        .any(|code| has_status(&msg, code))
        || msg.contains("internal server error")
        || msg.contains("bad gateway")
        || msg.contains("service unavailable")
        || msg.contains("overloaded")
    {
        return ProviderErrorKind::ServerError;
    }

    if has_status(&msg, "400") || msg.contains("bad request") || msg.contains("invalid_request") {
        return ProviderErrorKind::InvalidRequest;
    }

    ProviderErrorKind::Unknown
}
