//! API layer for the LLM router.
//!
//! This module contains the HTTP handlers, the upstream forwarder, and the
//! request/response models.

pub mod forward;
pub mod handlers;
pub mod models;

// Re-export commonly used types
pub use forward::{build_upstream_headers, forward, RequestDescriptor};
pub use handlers::{health, metrics_handler, proxy, router, AppState};
pub use models::{HealthResponse, Provider, ProviderInfo};
