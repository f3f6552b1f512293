//! `/chat` and `/code-generate`.

use {
    axum::{body::Bytes, extract::State, response::Response},
    modelgate_routing::{ChatTask, CodeTask},
    serde::{Deserialize, de::DeserializeOwned},
    tracing::debug,
};

use crate::{
    reply::{self, ReplyField},
    server::AppState,
};

#[derive(Debug, Default, Deserialize)]
struct ChatBody {
    content: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CodeBody {
    prompt: Option<String>,
    model: Option<String>,
    language: Option<String>,
}

/// Parse a JSON body leniently: anything unparseable counts as empty, so the
/// task's own validation answers with the missing-field error.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, "request body is not valid JSON");
        T::default()
    })
}

pub async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let body: ChatBody = parse_body(&body);
    let task = ChatTask::new(body.content.unwrap_or_default(), body.model);

    match state.gateway.router.route(&task).await {
        Ok(done) => {
            debug!(model = %done.model, provider = %done.provider, "chat served");
            reply::success(ReplyField::Response, done.text, done.model)
        },
        Err(e) => reply::route_error(ReplyField::Response, &e),
    }
}

pub async fn code_generate_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let body: CodeBody = parse_body(&body);
    let task = CodeTask::new(body.prompt.unwrap_or_default(), body.language, body.model);

    match state.gateway.router.route(&task).await {
        Ok(done) => {
            debug!(model = %done.model, provider = %done.provider, "code served");
            reply::success(ReplyField::Code, done.text, done.model)
        },
        Err(e) => reply::route_error(ReplyField::Code, &e),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_body_parsing() {
        let body: ChatBody = parse_body(br#"{"content":"hi","model":"gpt-4"}"#);
        assert_eq!(body.content.as_deref(), Some("hi"));
        assert_eq!(body.model.as_deref(), Some("gpt-4"));

        let body: ChatBody = parse_body(b"{not json");
        assert!(body.content.is_none());

        let body: CodeBody = parse_body(b"");
        assert!(body.prompt.is_none());

        let body: CodeBody = parse_body(br#"{"prompt":"sort","language":"rust","extra":1}"#);
        assert_eq!(body.language.as_deref(), Some("rust"));
    }
}
