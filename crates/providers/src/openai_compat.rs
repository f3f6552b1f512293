//! Shared request/response handling for OpenAI-compatible chat completion
//! endpoints (OpenAI itself and DeepSeek).

use {
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, trace, warn},
};

use crate::client::ProviderRequest;

/// Build the `/chat/completions` body for a single-turn request.
pub(crate) fn request_body(request: &ProviderRequest) -> serde_json::Value {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system.as_deref() {
        messages.push(serde_json::json!({ "role": "system", "content": system }));
    }
    messages.push(serde_json::json!({ "role": "user", "content": request.prompt }));

    serde_json::json!({
        "model": request.model,
        "messages": messages,
        "max_tokens": request.max_tokens,
    })
}

/// Pull the reply text out of a chat completion response.
pub(crate) fn extract_text(resp: &serde_json::Value) -> Option<String> {
    resp["choices"][0]["message"]["content"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// POST a chat completion and return the reply text.
///
/// `label` names the vendor in error messages ("OpenAI", "DeepSeek").
pub(crate) async fn chat_completion(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &Secret<String>,
    label: &str,
    request: &ProviderRequest,
) -> anyhow::Result<String> {
    let body = request_body(request);

    debug!(
        provider = label,
        model = %request.model,
        has_system = request.system.is_some(),
        max_tokens = request.max_tokens,
        "chat completion request"
    );
    trace!(body = %body, "chat completion request body");

    let http_resp = client
        .post(format!("{base_url}/chat/completions"))
        .header(
            "Authorization",
            format!("Bearer {}", api_key.expose_secret()),
        )
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await?;

    let status = http_resp.status();
    if !status.is_success() {
        let body_text = http_resp.text().await.unwrap_or_default();
        warn!(provider = label, status = %status, model = %request.model, "chat completion API error");
        anyhow::bail!("{label} API error HTTP {status}: {body_text}");
    }

    let resp = http_resp.json::<serde_json::Value>().await?;
    trace!(response = %resp, "chat completion raw response");

    extract_text(&resp)
        .ok_or_else(|| anyhow::anyhow!("{label} response contained no message content"))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_puts_system_first() {
        let body = request_body(&ProviderRequest {
            model: "gpt-4".into(),
            system: Some("be brief".into()),
            prompt: "hi".into(),
            max_tokens: 1000,
        });
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn body_without_system_has_one_message() {
        let body = request_body(&ProviderRequest {
            model: "gpt-4".into(),
            system: None,
            prompt: "hi".into(),
            max_tokens: 10,
        });
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn extract_ignores_usage_and_finish_reason() {
        let resp = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1}
        });
        assert_eq!(extract_text(&resp).as_deref(), Some("hello"));
    }

    #[test]
    fn extract_rejects_empty_content() {
        let resp = serde_json::json!({"choices": [{"message": {"content": "   "}}]});
        assert!(extract_text(&resp).is_none());
        assert!(extract_text(&serde_json::json!({})).is_none());
    }
}
