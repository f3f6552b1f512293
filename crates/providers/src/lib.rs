//! LLM provider plumbing: the static model registry, credential discovery and
//! one HTTP client per provider behind the [`ProviderClient`] trait.

pub mod anthropic;
pub mod client;
pub mod credentials;
pub mod deepseek;
pub mod openai;
mod openai_compat;
pub mod registry;

pub use {
    client::{ProviderClient, ProviderClients, ProviderRequest},
    credentials::Credentials,
    registry::{Capability, ModelDescriptor, ProviderId, ProviderRegistry, UnknownProvider},
};
