//! Core functionality for the LLM router.
//!
//! This module contains fundamental components used throughout the application:
//! - Configuration management
//! - Error handling
//! - Context-aware logging
//! - Metrics collection

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

// Re-export commonly used types
pub use config::{AppConfig, ProviderConfig, ServerConfig};
pub use error::{AppError, Result};
pub use logging::{generate_request_id, get_provider_context, get_request_id, PROVIDER_CONTEXT, REQUEST_ID};
pub use metrics::{get_metrics, init_metrics, Metrics};
