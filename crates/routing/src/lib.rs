//! Route a completion request to an LLM provider with ordered fallback.
//!
//! A request either pins an exact model id from the registry (one provider,
//! no fallback) or runs in auto mode, where providers are tried one at a time
//! in the configured priority order until one answers.
//!
//! Per request:
//! 1. Validate the payload
//! 2. Resolve the candidate set (pinned provider, or the priority list)
//! 3. Attempt credentialed candidates sequentially, each under a timeout
//! 4. Report success, the pinned failure, or exhaustion

pub mod classify;
pub mod error;
pub mod fence;
pub mod router;
pub mod task;

pub use {
    classify::{ProviderErrorKind, classify_error},
    error::{Exhausted, FailedAttempt, RouteError},
    fence::strip_code_fence,
    router::{Completion, FallbackRouter, RouterOptions},
    task::{AUTO_MODEL, ChatTask, CodeTask, RouteTask},
};
