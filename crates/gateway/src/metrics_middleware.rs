//! HTTP request metrics middleware.

use std::time::Instant;

use {
    axum::{body::Body, http::Request, middleware::Next, response::Response},
    modelgate_metrics::{counter, gauge, histogram, http as http_metrics, labels},
};

use crate::server::ENDPOINTS;

/// Middleware that records per-endpoint HTTP metrics.
///
/// - `modelgate_http_requests_total`: requests by endpoint, method and status
/// - `modelgate_http_request_duration_seconds`: request durations
/// - `modelgate_http_requests_in_flight`: requests currently being handled
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = endpoint_label(request.uri().path());

    gauge!(http_metrics::REQUESTS_IN_FLIGHT, labels::ENDPOINT => endpoint, labels::METHOD => method.clone())
        .increment(1.0);

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    let duration = start.elapsed().as_secs_f64();

    counter!(
        http_metrics::REQUESTS_TOTAL,
        labels::ENDPOINT => endpoint,
        labels::METHOD => method.clone(),
        labels::STATUS => status.clone()
    )
    .increment(1);

    histogram!(
        http_metrics::REQUEST_DURATION_SECONDS,
        labels::ENDPOINT => endpoint,
        labels::METHOD => method.clone(),
        labels::STATUS => status
    )
    .record(duration);

    gauge!(http_metrics::REQUESTS_IN_FLIGHT, labels::ENDPOINT => endpoint, labels::METHOD => method)
        .decrement(1.0);

    response
}

/// Collapse the mount prefixes onto one label per endpoint. Anything that is
/// not a known endpoint is labelled `other` to keep cardinality bounded.
fn endpoint_label(path: &str) -> &'static str {
    let path = path.trim_end_matches('/');
    let name = path
        .strip_prefix("/.netlify/functions")
        .or_else(|| path.strip_prefix("/api"))
        .unwrap_or(path);
    ENDPOINTS
        .iter()
        .copied()
        .find(|e| *e == name)
        .or_else(|| (path == "/metrics").then_some("/metrics"))
        .unwrap_or("other")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mounts_share_a_label() {
        assert_eq!(endpoint_label("/chat"), "/chat");
        assert_eq!(endpoint_label("/api/chat"), "/chat");
        assert_eq!(endpoint_label("/.netlify/functions/chat"), "/chat");
        assert_eq!(endpoint_label("/api/code-generate/"), "/code-generate");
        assert_eq!(endpoint_label("/metrics"), "/metrics");
    }

    #[test]
    fn unknown_paths_are_other() {
        assert_eq!(endpoint_label("/"), "other");
        assert_eq!(endpoint_label("/wp-admin/login.php"), "other");
        assert_eq!(endpoint_label("/api/sessions/123"), "other");
    }
}
