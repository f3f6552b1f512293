//! Metrics collection and export for modelgate.
//!
//! Metric names and label keys live in [`definitions`]; everything records
//! through the `metrics` crate facade. With the `prometheus` feature the
//! gateway renders the registry on `/metrics`.
//!
//! ```rust,ignore
//! use modelgate_metrics::{counter, labels, llm};
//!
//! counter!(llm::COMPLETIONS_TOTAL, labels::PROVIDER => "openai").increment(1);
//! ```

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
