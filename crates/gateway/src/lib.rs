//! Gateway: the HTTP surface in front of the fallback router.
//!
//! Lifecycle:
//! 1. Load config and resolve provider credentials
//! 2. Build provider clients and the router
//! 3. Install the metrics recorder (when enabled)
//! 4. Serve the endpoints under `/`, `/.netlify/functions` and `/api`
//!
//! Routing decisions live in `modelgate-routing`; this crate only parses
//! requests and shapes responses.

pub mod completion_routes;
#[cfg(feature = "metrics")]
pub mod metrics_middleware;
#[cfg(feature = "prometheus")]
pub mod metrics_routes;
pub mod models_routes;
pub mod reply;
pub mod server;
pub mod state;
pub mod status_routes;
