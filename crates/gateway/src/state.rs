use std::{sync::Arc, time::Duration};

#[cfg(feature = "metrics")]
use modelgate_metrics::MetricsHandle;

use {
    modelgate_config::ModelgateConfig,
    modelgate_providers::{Credentials, ProviderClients, ProviderRegistry},
    modelgate_routing::{FallbackRouter, RouterOptions},
    tracing::info,
};

/// Process-wide state shared by every request. Read-only after startup.
pub struct GatewayState {
    pub router: FallbackRouter,
    pub version: String,
    #[cfg(feature = "metrics")]
    pub metrics_handle: Option<MetricsHandle>,
}

impl GatewayState {
    pub fn new(router: FallbackRouter) -> Arc<Self> {
        Arc::new(Self {
            router,
            version: env!("CARGO_PKG_VERSION").to_string(),
            #[cfg(feature = "metrics")]
            metrics_handle: None,
        })
    }

    #[cfg(feature = "metrics")]
    pub fn with_metrics(router: FallbackRouter, metrics_handle: Option<MetricsHandle>) -> Arc<Self> {
        Arc::new(Self {
            router,
            version: env!("CARGO_PKG_VERSION").to_string(),
            metrics_handle,
        })
    }

    /// Resolve credentials from the environment and config, then build the
    /// provider clients and router.
    pub fn build_router(config: &ModelgateConfig) -> anyhow::Result<FallbackRouter> {
        let options = RouterOptions::from_config(&config.routing);
        let credentials = Credentials::from_env_with_config(&config.providers);
        if credentials.is_empty() {
            info!("no provider credentials found, requests will get mock responses");
        }
        let clients =
            ProviderClients::from_credentials(&credentials, &config.providers, options.attempt_timeout)?;
        let registry = Arc::new(ProviderRegistry::from_config(&config.providers));
        Ok(FallbackRouter::new(registry, clients, options))
    }

    /// Seconds a single provider attempt may take.
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        self.router.options().attempt_timeout
    }
}
