//! LLM Router - a failover reverse proxy for LLM APIs
//!
//! This library provides a stateless reverse proxy that forwards inbound API
//! requests to an ordered list of upstream providers:
//!
//! - **Priority Selection**: providers are tried in configuration order; the
//!   first one not flagged unavailable handles the request
//! - **Quota Failover**: upstream error bodies carrying a rate/quota-limit
//!   signature invalidate the provider for 24 hours and the request is
//!   transparently retried against the next one
//! - **Streaming Pass-Through**: successful responses are relayed as byte
//!   streams without buffering, preserving incremental token streams
//! - **Shared Availability**: invalidations live in a TTL key-value store
//!   (Redis in production) so they are visible across proxy instances
//!
//! # Architecture
//!
//! The codebase is organized into three layers:
//!
//! - [`core`]: configuration, errors, logging context, metrics
//! - [`services`]: availability store, provider registry, quota detection
//! - [`api`]: HTTP handlers and the upstream forwarder
//!
//! # Configuration
//!
//! Providers come from a YAML config file (`CONFIG_PATH`, default
//! `config.yaml`) or the `PROVIDERS_JSON` environment variable. Optional
//! environment variables: `HOST`, `PORT`, `REDIS_URL`.

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use crate::api::{router, AppState, Provider};
pub use crate::core::{AppConfig, AppError, ProviderConfig, Result};
pub use crate::services::{
    is_quota_limit, AvailabilityStore, MemoryStore, ProviderRegistry, RedisStore,
};
