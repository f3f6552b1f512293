//! `/models`: what a caller may put in the `model` field.

use {
    axum::{
        extract::{Query, State},
        http::StatusCode,
        response::{IntoResponse, Json, Response},
    },
    modelgate_providers::{Capability, ProviderClients, ProviderRegistry},
    modelgate_routing::AUTO_MODEL,
    serde::{Deserialize, Serialize},
};

use crate::{reply, server::AppState};

const MOCK_MODEL: &str = "mock";

#[derive(Debug, Default, Deserialize)]
pub struct ModelsQuery {
    capability: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    pub provider: String,
}

impl ModelEntry {
    fn new(id: &str, name: &str, provider: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: provider.to_string(),
        }
    }
}

/// `auto` first, then every model whose provider has a credential, then
/// `mock`.
#[must_use]
pub fn available_models(
    registry: &ProviderRegistry,
    clients: &ProviderClients,
    capability: Capability,
) -> Vec<ModelEntry> {
    let mut models = vec![ModelEntry::new(AUTO_MODEL, "Auto (best available)", AUTO_MODEL)];
    models.extend(
        registry
            .list_models(capability)
            .filter(|m| clients.is_configured(m.provider))
            .map(|m| ModelEntry::new(m.id, m.display_name, m.provider.as_str())),
    );
    models.push(ModelEntry::new(MOCK_MODEL, "Mock Model", MOCK_MODEL));
    models
}

pub async fn models_handler(
    State(state): State<AppState>,
    Query(query): Query<ModelsQuery>,
) -> Response {
    let capability = match query.capability.as_deref().map(str::parse::<Capability>) {
        None => Capability::Chat,
        Some(Ok(capability)) => capability,
        Some(Err(e)) => return reply::plain_error(StatusCode::BAD_REQUEST, &e),
    };
    let router = &state.gateway.router;
    let models = available_models(router.registry(), router.clients(), capability);
    Json(serde_json::json!({ "models": models })).into_response()
}
