//! Error types and handling for the LLM router.
//!
//! This module provides a unified error type [`AppError`] that wraps the failure
//! sources of the proxy core and implements proper HTTP response conversion.
//!
//! Only terminal states are represented here. Quota-limit responses from an
//! upstream are not errors at this level: they are resolved inside the retry
//! loop by invalidating the provider and trying the next one.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the application.
///
/// All errors in the application should be converted to this type for consistent handling.
#[derive(Error, Debug)]
pub enum AppError {
    /// Every configured provider is currently flagged unavailable
    #[error("No providers available")]
    NoProviderAvailable,

    /// Transport-level failure reaching a provider (connect, DNS, reset).
    /// The provider is NOT invalidated for these: a network blip must not
    /// blacklist a healthy provider for a whole cooldown window.
    #[error("Upstream transport error: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Availability store I/O failure
    #[error("Availability store error: {0}")]
    Store(#[from] redis::RedisError),

    /// Generic internal errors with custom message
    #[error("Internal proxy error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NoProviderAvailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"error": "No providers available"}),
            ),
            other => {
                // Details are logged but never leaked to the caller.
                tracing::error!(error = %other, "Request terminated inside the proxy");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Proxy failure"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
