//! Metrics recorder initialization.

use {anyhow::Result, tracing::info};

/// Handle to the metrics system, used by the `/metrics` endpoint.
#[derive(Clone)]
pub struct MetricsHandle {
    #[cfg(feature = "prometheus")]
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsHandle {
    /// Render metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        #[cfg(feature = "prometheus")]
        {
            self.prometheus_handle.render()
        }
        #[cfg(not(feature = "prometheus"))]
        {
            String::new()
        }
    }
}

/// Configuration for the metrics system.
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorderConfig {
    /// Whether metrics collection is enabled
    pub enabled: bool,
    /// Global labels to add to all metrics
    pub global_labels: Vec<(String, String)>,
}

/// Initialize the metrics system.
///
/// Call once at startup. Returns `None` when collection is disabled, in which
/// case the `metrics` facade stays a no-op.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed.
pub fn init_metrics(config: MetricsRecorderConfig) -> Result<Option<MetricsHandle>> {
    if !config.enabled {
        info!("metrics collection is disabled");
        return Ok(None);
    }

    #[cfg(feature = "prometheus")]
    {
        let handle = init_prometheus(config)?;
        info!("prometheus metrics exporter initialized");
        Ok(Some(MetricsHandle {
            prometheus_handle: handle,
        }))
    }

    #[cfg(not(feature = "prometheus"))]
    {
        let _ = config;
        info!("metrics enabled in config but the prometheus feature is not compiled in");
        Ok(None)
    }
}

#[cfg(feature = "prometheus")]
fn init_prometheus(
    config: MetricsRecorderConfig,
) -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    use {
        crate::buckets,
        metrics_exporter_prometheus::{Matcher, PrometheusBuilder},
    };

    let mut builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(crate::http::REQUEST_DURATION_SECONDS.to_string()),
            buckets::HTTP_DURATION,
        )?
        .set_buckets_for_metric(
            Matcher::Full(crate::llm::COMPLETION_DURATION_SECONDS.to_string()),
            buckets::LLM_DURATION,
        )?;

    for (key, value) in config.global_labels {
        builder = builder.add_global_label(key, value);
    }

    // install_recorder() installs globally and hands back a render handle
    // without spawning its own HTTP listener.
    Ok(builder.install_recorder()?)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_returns_no_handle() {
        let handle = init_metrics(MetricsRecorderConfig::default()).unwrap();
        assert!(handle.is_none());
    }

    #[test]
    fn buckets_are_sorted() {
        for b in [crate::buckets::HTTP_DURATION, crate::buckets::LLM_DURATION] {
            assert!(b.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
