//! `/default` liveness probe and `/debug` environment report.
//!
//! Both report whether each provider has a credential. Key values are never
//! included.

use {
    axum::{
        extract::State,
        http::{HeaderMap, Method, Uri},
        response::{IntoResponse, Json},
    },
    modelgate_providers::{ProviderClients, ProviderId},
    serde_json::{Map, Value, json},
};

use crate::server::AppState;

fn has_api_keys(clients: &ProviderClients) -> Value {
    let map: Map<String, Value> = ProviderId::ALL
        .into_iter()
        .map(|p| (p.as_str().to_string(), Value::Bool(clients.is_configured(p))))
        .collect();
    Value::Object(map)
}

fn key_status(clients: &ProviderClients) -> Value {
    let map: Map<String, Value> = ProviderId::ALL
        .into_iter()
        .map(|p| {
            let status = if clients.is_configured(p) {
                "Set (redacted)"
            } else {
                "Not set"
            };
            (p.env_key().to_string(), Value::String(status.into()))
        })
        .collect();
    Value::Object(map)
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Answers any method with `200`.
pub async fn default_handler(State(state): State<AppState>) -> impl IntoResponse {
    let gw = &state.gateway;
    Json(json!({
        "status": "online",
        "message": "modelgate is working!",
        "timestamp": timestamp(),
        "environment": {
            "version": gw.version,
            "has_api_keys": has_api_keys(gw.router.clients()),
        },
    }))
}

pub async fn debug_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    let gw = &state.gateway;
    let router = &gw.router;
    let options = router.options();
    let header_names: Vec<&str> = headers.keys().map(|k| k.as_str()).collect();

    Json(json!({
        "message": "modelgate debug information",
        "status": "online",
        "environment": {
            "version": gw.version,
            "env_variables": key_status(router.clients()),
            "has_api_keys": has_api_keys(router.clients()),
            "configured_providers": router.clients().configured(),
            "routing": {
                "chat_order": options.chat_order,
                "code_order": options.code_order,
                "attempt_timeout_secs": gw.attempt_timeout().as_secs(),
            },
            "event_method": method.as_str(),
            "event_path": uri.path(),
            "event_headers": header_names,
            "timestamp": timestamp(),
        },
    }))
}
