use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        http::StatusCode,
        response::Response,
        routing::{any, get, post},
    },
    modelgate_config::ModelgateConfig,
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use crate::{
    completion_routes::{chat_handler, code_generate_handler},
    models_routes::models_handler,
    reply,
    state::GatewayState,
    status_routes::{debug_handler, default_handler},
};

/// Endpoint paths, each also mounted under [`MOUNT_PREFIXES`].
pub const ENDPOINTS: &[&str] = &["/chat", "/code-generate", "/models", "/debug", "/default"];

/// Extra mount points kept so existing front-ends work unchanged.
pub const MOUNT_PREFIXES: &[&str] = &["/.netlify/functions", "/api"];

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

// ── Router ───────────────────────────────────────────────────────────────────

async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    reply::plain_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn not_found() -> Response {
    reply::plain_error(StatusCode::NOT_FOUND, "Not found")
}

/// The five endpoints, relative to a mount point.
fn endpoint_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/chat",
            post(chat_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/code-generate",
            post(code_generate_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/models",
            get(models_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/debug",
            get(debug_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed),
        )
        .route("/default", any(default_handler))
}

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = endpoint_routes();
    for prefix in MOUNT_PREFIXES {
        router = router.nest(prefix, endpoint_routes());
    }

    #[cfg(feature = "prometheus")]
    let router = router.route(
        "/metrics",
        get(crate::metrics_routes::prometheus_metrics_handler),
    );

    #[cfg(feature = "metrics")]
    let router = router.layer(axum::middleware::from_fn(
        crate::metrics_middleware::http_metrics_middleware,
    ));

    router
        .fallback(not_found)
        .layer(cors)
        .with_state(AppState { gateway: state })
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Start the HTTP server and serve until Ctrl-C.
pub async fn start_gateway(config: &ModelgateConfig, bind: &str, port: u16) -> anyhow::Result<()> {
    let router = GatewayState::build_router(config)?;

    #[cfg(feature = "metrics")]
    let state = {
        let handle = modelgate_metrics::init_metrics(modelgate_metrics::MetricsRecorderConfig {
            enabled: config.metrics.enabled,
            global_labels: vec![("service".into(), "modelgate".into())],
        })?;
        GatewayState::with_metrics(router, handle)
    };
    #[cfg(not(feature = "metrics"))]
    let state = GatewayState::new(router);

    let configured: Vec<&str> = state
        .router
        .clients()
        .configured()
        .into_iter()
        .map(|p| p.as_str())
        .collect();
    let app = build_gateway_app(Arc::clone(&state));

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        version = %state.version,
        providers = ?configured,
        "modelgate listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("modelgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
