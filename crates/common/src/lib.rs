//! Helpers shared by the modelgate crates.

pub mod context;

pub use context::FromMessage;
