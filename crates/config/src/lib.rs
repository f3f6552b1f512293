//! Configuration loading, validation and env substitution.
//!
//! Config files: `modelgate.toml`, `modelgate.yaml`, or `modelgate.json`
//! Searched in `./` then `~/.config/modelgate/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    env_subst::has_unresolved_placeholder,
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file, load_config, set_config_dir},
    schema::{
        KNOWN_PROVIDER_NAMES, MetricsConfig, ModelgateConfig, ProviderEntry, ProvidersConfig,
        RoutingConfig, ServerConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult},
};
