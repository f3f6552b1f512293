//! Request tasks: what to send for a chat or code request, and how to clean up
//! the reply.

use modelgate_providers::{Capability, ProviderRequest};

use crate::{error::RouteError, fence::strip_code_fence};

const CHAT_SYSTEM_PROMPT: &str = "You are a helpful and friendly AI assistant. You should engage in natural conversation, be polite, and provide helpful responses.";
const CODE_SYSTEM_PROMPT: &str = "You are a code-only assistant. You must only return code without explanations or markdown formatting. Do not include any text before or after the code.";

const CHAT_MAX_TOKENS: u32 = 1000;
const CODE_MAX_TOKENS: u32 = 2000;

/// The model token meaning "let the router pick".
pub const AUTO_MODEL: &str = "auto";

/// A request the [`FallbackRouter`](crate::FallbackRouter) can route.
pub trait RouteTask: Send + Sync {
    /// Short label for logs and metrics (`"chat"`, `"code"`).
    fn name(&self) -> &'static str;

    fn capability(&self) -> Capability;

    /// The model the caller pinned, or `None` in auto mode.
    fn requested_model(&self) -> Option<&str>;

    fn validate(&self) -> Result<(), RouteError>;

    /// Shape the provider call for `model`.
    fn provider_request(&self, model: &str) -> ProviderRequest;

    /// Clean up provider output before it is returned.
    fn post_process(&self, text: String) -> String {
        text
    }
}

/// `"auto"` and empty strings both mean auto mode.
fn pinned(model: Option<&str>) -> Option<&str> {
    model
        .map(str::trim)
        .filter(|m| !m.is_empty() && *m != AUTO_MODEL)
}

/// A single-turn conversational request.
#[derive(Debug, Clone)]
pub struct ChatTask {
    content: String,
    model: Option<String>,
}

impl ChatTask {
    pub fn new(content: impl Into<String>, model: Option<String>) -> Self {
        Self {
            content: content.into(),
            model,
        }
    }
}

impl RouteTask for ChatTask {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn capability(&self) -> Capability {
        Capability::Chat
    }

    fn requested_model(&self) -> Option<&str> {
        pinned(self.model.as_deref())
    }

    fn validate(&self) -> Result<(), RouteError> {
        if self.content.trim().is_empty() {
            return Err(RouteError::InvalidRequest("Missing content in request"));
        }
        Ok(())
    }

    fn provider_request(&self, model: &str) -> ProviderRequest {
        ProviderRequest {
            model: model.to_string(),
            system: Some(CHAT_SYSTEM_PROMPT.to_string()),
            prompt: self.content.clone(),
            max_tokens: CHAT_MAX_TOKENS,
        }
    }
}

/// A code generation request. Replies come back without a markdown fence.
#[derive(Debug, Clone)]
pub struct CodeTask {
    prompt: String,
    language: Option<String>,
    model: Option<String>,
}

impl CodeTask {
    pub fn new(prompt: impl Into<String>, language: Option<String>, model: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            language: language.filter(|l| !l.trim().is_empty()),
            model,
        }
    }

    fn user_prompt(&self) -> String {
        let target = self
            .language
            .as_deref()
            .map(|l| format!(" in {}", l.trim()))
            .unwrap_or_default();
        format!(
            "Generate ONLY code{target} for the following task: {}. Return ONLY the code without any explanations, comments, or markdown formatting.",
            self.prompt
        )
    }
}

impl RouteTask for CodeTask {
    fn name(&self) -> &'static str {
        "code"
    }

    fn capability(&self) -> Capability {
        Capability::Code
    }

    fn requested_model(&self) -> Option<&str> {
        pinned(self.model.as_deref())
    }

    fn validate(&self) -> Result<(), RouteError> {
        if self.prompt.trim().is_empty() {
            return Err(RouteError::InvalidRequest("Missing prompt in request"));
        }
        Ok(())
    }

    fn provider_request(&self, model: &str) -> ProviderRequest {
        ProviderRequest {
            model: model.to_string(),
            system: Some(CODE_SYSTEM_PROMPT.to_string()),
            prompt: self.user_prompt(),
            max_tokens: CODE_MAX_TOKENS,
        }
    }

    fn post_process(&self, text: String) -> String {
        strip_code_fence(text.trim())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(None, None)]
    #[case(Some("auto"), None)]
    #[case(Some(""), None)]
    #[case(Some("  "), None)]
    #[case(Some("gpt-4"), Some("gpt-4"))]
    fn auto_and_empty_mean_unpinned(#[case] model: Option<&str>, #[case] expected: Option<&str>) {
        let task = ChatTask::new("hi", model.map(String::from));
        assert_eq!(task.requested_model(), expected);
    }

    #[test]
    fn empty_content_is_rejected() {
        let err = ChatTask::new("   ", None).validate().unwrap_err();
        assert_eq!(err, RouteError::InvalidRequest("Missing content in request"));
        let err = CodeTask::new("", None, None).validate().unwrap_err();
        assert_eq!(err, RouteError::InvalidRequest("Missing prompt in request"));
    }

    #[test]
    fn chat_request_shape() {
        let req = ChatTask::new("hello", None).provider_request("gpt-4");
        assert_eq!(req.model, "gpt-4");
        assert_eq!(req.prompt, "hello");
        assert_eq!(req.max_tokens, 1000);
        assert_eq!(req.system.as_deref(), Some(CHAT_SYSTEM_PROMPT));
    }

    #[test]
    fn code_prompt_mentions_language_when_given() {
        let req = CodeTask::new("reverse a string", Some("python".into()), None)
            .provider_request("deepseek-coder");
        assert!(
            req.prompt
                .starts_with("Generate ONLY code in python for the following task: reverse a string.")
        );
        assert_eq!(req.max_tokens, 2000);

        let req = CodeTask::new("reverse a string", Some(" ".into()), None).provider_request("x");
        assert!(
            req.prompt
                .starts_with("Generate ONLY code for the following task: reverse a string.")
        );
    }

    #[test]
    fn code_output_is_unfenced() {
        let task = CodeTask::new("p", None, None);
        assert_eq!(task.post_process("\n```js\ncode\n```\n".into()), "code");
        assert_eq!(task.post_process("  plain  ".into()), "plain");
    }
}
