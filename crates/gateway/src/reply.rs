//! Shape router outcomes into HTTP responses.
//!
//! Error bodies keep the field the caller reads on success (`response` for
//! chat, `code` for code generation) so front-ends can always render
//! something.

use {
    axum::{
        http::StatusCode,
        response::{IntoResponse, Json, Response},
    },
    modelgate_routing::{Exhausted, RouteError},
    serde_json::json,
};

const INVALID_KEY_MESSAGE: &str = "Invalid API key. Please check your API key configuration.";
const CONNECTION_MESSAGE: &str = "I encountered an error connecting to the AI service. Please try again.";

/// Which success field an endpoint reports text in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyField {
    Response,
    Code,
}

impl ReplyField {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Response => "response",
            Self::Code => "code",
        }
    }

    /// Error text for this field. Code replies are commented out with `# `.
    #[must_use]
    pub fn error_text(self, message: &str) -> String {
        match self {
            Self::Response => message.to_string(),
            Self::Code => format!("# {message}"),
        }
    }
}

/// Successful completion body.
pub fn success(field: ReplyField, text: String, model: String) -> Response {
    Json(json!({ field.key(): text, "model": model })).into_response()
}

/// Status code for a routing failure.
#[must_use]
pub fn status_for(err: &RouteError) -> StatusCode {
    match err {
        RouteError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        RouteError::ProviderUnavailable { .. }
        | RouteError::AllProvidersExhausted(Exhausted::NoCredentials { .. }) => {
            StatusCode::SERVICE_UNAVAILABLE
        },
        RouteError::ProviderCallFailed { .. }
        | RouteError::AllProvidersExhausted(Exhausted::AllFailed { .. }) => {
            if err.is_credential_error() {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    }
}

/// Error body for a routing failure.
pub fn route_error(field: ReplyField, err: &RouteError) -> Response {
    let status = status_for(err);
    let body = match err {
        RouteError::InvalidRequest(message) => json!({ "error": message }),
        _ if status == StatusCode::SERVICE_UNAVAILABLE => json!({
            field.key(): field.error_text(&err.to_string()),
            "model": err.model_sentinel(),
        }),
        _ => {
            let raw = err.to_string();
            // Chat replies get a friendly sentence; code replies carry the raw
            // failure as a comment.
            let text = match field {
                ReplyField::Response if status == StatusCode::UNAUTHORIZED => {
                    INVALID_KEY_MESSAGE.to_string()
                },
                ReplyField::Response => CONNECTION_MESSAGE.to_string(),
                ReplyField::Code => field.error_text(&format!("Error: {raw}")),
            };
            json!({
                field.key(): text,
                "error": raw,
                "model": err.model_sentinel(),
            })
        },
    };
    (status, Json(body)).into_response()
}

/// `{error}` body with the given status.
pub fn plain_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
