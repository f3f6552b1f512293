//! Metric name and label definitions.

/// HTTP request metrics
pub mod http {
    /// Total number of HTTP requests handled
    pub const REQUESTS_TOTAL: &str = "modelgate_http_requests_total";
    /// Duration of HTTP requests in seconds
    pub const REQUEST_DURATION_SECONDS: &str = "modelgate_http_request_duration_seconds";
    /// Number of currently in-flight HTTP requests
    pub const REQUESTS_IN_FLIGHT: &str = "modelgate_http_requests_in_flight";
}

/// Provider call metrics
pub mod llm {
    /// Provider calls that returned text
    pub const COMPLETIONS_TOTAL: &str = "modelgate_llm_completions_total";
    /// Duration of a single provider call in seconds
    pub const COMPLETION_DURATION_SECONDS: &str = "modelgate_llm_completion_duration_seconds";
    /// Provider calls that failed or timed out
    pub const COMPLETION_ERRORS_TOTAL: &str = "modelgate_llm_completion_errors_total";
    /// Auto-mode requests that moved past a failing provider
    pub const FALLBACKS_TOTAL: &str = "modelgate_llm_fallbacks_total";
    /// Requests that ended without any provider serving them
    pub const EXHAUSTED_TOTAL: &str = "modelgate_llm_exhausted_total";
}

pub mod labels {
    pub const ENDPOINT: &str = "endpoint";
    pub const METHOD: &str = "method";
    pub const STATUS: &str = "status";
    pub const PROVIDER: &str = "provider";
    pub const MODEL: &str = "model";
    pub const TASK: &str = "task";
    pub const REASON: &str = "reason";
}

/// Histogram buckets, in seconds.
pub mod buckets {
    /// 1ms to 60s
    pub const HTTP_DURATION: &[f64] = &[
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
    ];

    /// 100ms to 2 minutes; provider calls are capped by the attempt timeout
    pub const LLM_DURATION: &[f64] = &[
        0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0,
    ];
}
