use std::{sync::Arc, time::Duration};

#[cfg(feature = "metrics")]
use std::time::Instant;

use {
    modelgate_config::RoutingConfig,
    modelgate_providers::{
        Capability, ModelDescriptor, ProviderClient, ProviderClients, ProviderId, ProviderRegistry,
    },
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use modelgate_metrics::{counter, histogram, labels, llm as llm_metrics};

use crate::{
    error::{Exhausted, FailedAttempt, RouteError},
    task::RouteTask,
};

/// A successful routed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Registry id of the model that served the request.
    pub model: String,
    pub provider: ProviderId,
}

/// Priority lists and per-attempt limits.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub chat_order: Vec<ProviderId>,
    pub code_order: Vec<ProviderId>,
    pub attempt_timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            chat_order: ProviderId::ALL.to_vec(),
            code_order: ProviderId::ALL.to_vec(),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RouterOptions {
    /// Build options from `[routing]`. Unknown names and repeats are dropped;
    /// an order that ends up empty falls back to the built-in order.
    #[must_use]
    pub fn from_config(config: &RoutingConfig) -> Self {
        let defaults = Self::default();
        let attempt_timeout = if config.attempt_timeout_secs == 0 {
            warn!("routing.attempt_timeout_secs is 0, using default");
            defaults.attempt_timeout
        } else {
            Duration::from_secs(config.attempt_timeout_secs)
        };
        Self {
            chat_order: parse_order("chat_order", &config.chat_order),
            code_order: parse_order("code_order", &config.code_order),
            attempt_timeout,
        }
    }

    #[must_use]
    pub fn order_for(&self, capability: Capability) -> &[ProviderId] {
        match capability {
            Capability::Chat => &self.chat_order,
            Capability::Code => &self.code_order,
        }
    }
}

fn parse_order(field: &str, names: &[String]) -> Vec<ProviderId> {
    let mut order = Vec::with_capacity(names.len());
    for name in names {
        match name.parse::<ProviderId>() {
            Ok(provider) if !order.contains(&provider) => order.push(provider),
            Ok(provider) => warn!(field, %provider, "duplicate provider in routing order"),
            Err(e) => warn!(field, error = %e, "ignoring routing order entry"),
        }
    }
    if order.is_empty() {
        order = ProviderId::ALL.to_vec();
    }
    order
}

/// Routes tasks to providers: one pinned provider, or the priority list with
/// sequential fallback.
///
/// The router holds no mutable state; one instance serves all requests.
#[derive(Debug, Clone)]
pub struct FallbackRouter {
    registry: Arc<ProviderRegistry>,
    clients: ProviderClients,
    options: RouterOptions,
}

impl FallbackRouter {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        clients: ProviderClients,
        options: RouterOptions,
    ) -> Self {
        info!(
            providers = ?clients.configured(),
            chat_order = ?options.chat_order,
            code_order = ?options.code_order,
            attempt_timeout_secs = options.attempt_timeout.as_secs(),
            "fallback router ready"
        );
        Self {
            registry,
            clients,
            options,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    #[must_use]
    pub fn clients(&self) -> &ProviderClients {
        &self.clients
    }

    #[must_use]
    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Run `task` to completion.
    ///
    /// An exact registry id that supports the task's capability pins that
    /// model's provider: it is called at most once and its failure is returned
    /// as-is. `"auto"`, an id the registry does not know, or a code-only id on
    /// a chat task tries every credentialed provider in priority order.
    pub async fn route<T: RouteTask>(&self, task: &T) -> Result<Completion, RouteError> {
        task.validate()?;

        let requested = task.requested_model();
        if let Some(id) = requested
            && let Some(descriptor) = self
                .registry
                .resolve(id)
                .filter(|d| d.supports(task.capability()))
        {
            return self.route_pinned(task, descriptor).await;
        }

        if let Some(id) = requested {
            debug!(task = task.name(), model = id, "model not offered for this task, routing in auto mode");
        }
        self.route_auto(task).await
    }

    async fn route_pinned<T: RouteTask>(
        &self,
        task: &T,
        descriptor: &ModelDescriptor,
    ) -> Result<Completion, RouteError> {
        let provider = descriptor.provider;
        let Some(client) = self.clients.get(provider) else {
            debug!(task = task.name(), model = descriptor.id, %provider, "pinned provider has no credential");
            record_exhausted(task, "unavailable");
            return Err(RouteError::ProviderUnavailable {
                model: descriptor.id.to_string(),
                provider,
            });
        };

        match self.attempt(client.as_ref(), task, descriptor.id).await {
            Ok(text) => Ok(Completion {
                text,
                model: descriptor.id.to_string(),
                provider,
            }),
            Err(message) => {
                warn!(
                    task = task.name(),
                    %provider,
                    model = descriptor.id,
                    error = %message,
                    "pinned provider failed"
                );
                Err(RouteError::ProviderCallFailed {
                    provider,
                    model: descriptor.id.to_string(),
                    message,
                })
            },
        }
    }

    async fn route_auto<T: RouteTask>(&self, task: &T) -> Result<Completion, RouteError> {
        let capability = task.capability();
        let order = self.options.order_for(capability);
        let mut attempts: Vec<FailedAttempt> = Vec::new();

        for &provider in order {
            let Some(client) = self.clients.get(provider) else {
                continue;
            };
            let model = self.registry.default_model(provider, capability).to_string();

            match self.attempt(client.as_ref(), task, &model).await {
                Ok(text) => {
                    if !attempts.is_empty() {
                        debug!(
                            task = task.name(),
                            %provider,
                            failed = attempts.len(),
                            "served after fallback"
                        );
                    }
                    return Ok(Completion {
                        text,
                        model,
                        provider,
                    });
                },
                Err(message) => {
                    let attempt = FailedAttempt::new(provider, &model, message);
                    warn!(
                        task = task.name(),
                        %provider,
                        model = %model,
                        error = %attempt.message,
                        kind = attempt.kind.as_str(),
                        "provider failed, trying next in order"
                    );
                    #[cfg(feature = "metrics")]
                    counter!(
                        llm_metrics::FALLBACKS_TOTAL,
                        labels::TASK => task.name(),
                        labels::PROVIDER => provider.as_str()
                    )
                    .increment(1);
                    attempts.push(attempt);
                },
            }
        }

        let exhausted = match attempts.last() {
            None => {
                record_exhausted(task, "no_credentials");
                Exhausted::NoCredentials {
                    missing: order
                        .iter()
                        .copied()
                        .filter(|p| !self.clients.is_configured(*p))
                        .collect(),
                }
            },
            Some(last) => {
                record_exhausted(task, "all_failed");
                let last_error = last.message.clone();
                Exhausted::AllFailed {
                    attempts,
                    last_error,
                }
            },
        };
        Err(RouteError::AllProvidersExhausted(exhausted))
    }

    /// One provider call under the attempt timeout. Errors come back as text.
    async fn attempt<T: RouteTask>(
        &self,
        client: &dyn ProviderClient,
        task: &T,
        model: &str,
    ) -> Result<String, String> {
        let provider = client.provider();
        let request = task.provider_request(model);
        debug!(task = task.name(), %provider, model, "calling provider");

        #[cfg(feature = "metrics")]
        let start = Instant::now();

        let result =
            match tokio::time::timeout(self.options.attempt_timeout, client.complete(&request))
                .await
            {
                Ok(Ok(text)) => Ok(task.post_process(text)),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!(
                    "{} request timed out after {}s",
                    provider.display_name(),
                    self.options.attempt_timeout.as_secs_f64()
                )),
            };

        #[cfg(feature = "metrics")]
        match &result {
            Ok(_) => {
                counter!(
                    llm_metrics::COMPLETIONS_TOTAL,
                    labels::PROVIDER => provider.as_str(),
                    labels::MODEL => model.to_string()
                )
                .increment(1);
                histogram!(
                    llm_metrics::COMPLETION_DURATION_SECONDS,
                    labels::PROVIDER => provider.as_str(),
                    labels::MODEL => model.to_string()
                )
                .record(start.elapsed().as_secs_f64());
            },
            Err(message) => {
                counter!(
                    llm_metrics::COMPLETION_ERRORS_TOTAL,
                    labels::PROVIDER => provider.as_str(),
                    labels::MODEL => model.to_string(),
                    labels::REASON => crate::classify::classify_error(message).as_str()
                )
                .increment(1);
            },
        }

        result
    }
}

fn record_exhausted<T: RouteTask>(task: &T, reason: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(
        llm_metrics::EXHAUSTED_TOTAL,
        labels::TASK => task.name(),
        labels::REASON => reason
    )
    .increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = (task, reason);
}
