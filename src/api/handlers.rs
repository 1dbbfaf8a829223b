//! HTTP request handlers for the LLM router.
//!
//! The proxy handler drives the whole failover sequence for one inbound
//! request: select a provider, forward, classify failures, retry. The retry is
//! an explicit bounded loop, never recursion, so termination within one cycle
//! per configured provider is structural.

use crate::api::forward::{forward, relay_buffered, relay_streaming, RequestDescriptor};
use crate::api::models::{HealthResponse, Provider, ProviderInfo};
use crate::core::logging::{generate_request_id, get_request_id, PROVIDER_CONTEXT, REQUEST_ID};
use crate::core::metrics::{get_metrics, init_metrics};
use crate::core::{AppError, Result};
use crate::services::{is_quota_limit, ProviderRegistry};
use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Cap on the inbound request body; matches the previous deployment's limit.
const MAX_INBOUND_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: ProviderRegistry,
    pub http_client: reqwest::Client,
}

/// Build the application router.
///
/// `/health` and `/metrics` are served locally; every other method/path
/// combination is proxied upstream with failover.
pub fn router(state: Arc<AppState>) -> Router {
    init_metrics();

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .fallback(proxy)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Proxy an inbound request to the first available provider, failing over on
/// quota-limit responses.
pub async fn proxy(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let request_id = generate_request_id();

    REQUEST_ID
        .scope(request_id, async move {
            match run_failover(&state, request).await {
                Ok(response) => response,
                Err(error) => error.into_response(),
            }
        })
        .await
}

/// Outcome of a single provider attempt.
enum AttemptOutcome {
    /// Terminal: a response (streamed success or verbatim error) for the caller.
    Relay(Response),
    /// The provider was invalidated for a quota limit; try the next one.
    QuotaLimited,
}

async fn run_failover(state: &AppState, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    // Buffer the inbound body once so every retry replays identical bytes.
    let body = axum::body::to_bytes(body, MAX_INBOUND_BODY_BYTES)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read inbound body: {}", e)))?;

    let descriptor = RequestDescriptor {
        method: parts.method,
        path_and_query,
        headers: parts.headers,
        body,
    };

    tracing::debug!(
        request_id = %get_request_id(),
        method = %descriptor.method,
        path = %descriptor.path_and_query,
        "Incoming request"
    );

    // Each quota-limited attempt invalidates its provider, so at most one
    // cycle per configured provider can run before selection comes up empty.
    let max_attempts = state.registry.len();
    for attempt_no in 1..=max_attempts {
        let Some(provider) = state.registry.next_available().await? else {
            return Err(AppError::NoProviderAvailable);
        };

        match attempt(state, &descriptor, provider, attempt_no).await? {
            AttemptOutcome::Relay(response) => return Ok(response),
            AttemptOutcome::QuotaLimited => continue,
        }
    }

    Err(AppError::NoProviderAvailable)
}

async fn attempt(
    state: &AppState,
    descriptor: &RequestDescriptor,
    provider: Provider,
    attempt_no: usize,
) -> Result<AttemptOutcome> {
    let provider_name = provider.name.clone();

    PROVIDER_CONTEXT
        .scope(provider_name, async move {
            let request_id = get_request_id();
            let start = Instant::now();

            tracing::debug!(
                request_id = %request_id,
                provider = %provider.name,
                attempt = attempt_no,
                "Forwarding request to provider"
            );

            let response = match forward(&state.http_client, descriptor, &provider).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::error!(
                        request_id = %request_id,
                        provider = %provider.name,
                        error = %error,
                        "Transport failure reaching provider"
                    );
                    // Transport failures do not invalidate: a single network
                    // blip must not bench a healthy provider for a day.
                    return Err(error);
                }
            };

            let status = response.status();
            let metrics = get_metrics();
            metrics
                .request_count
                .with_label_values(&[descriptor.method.as_str(), &provider.name, status.as_str()])
                .inc();
            metrics
                .request_duration
                .with_label_values(&[descriptor.method.as_str(), &provider.name])
                .observe(start.elapsed().as_secs_f64());

            if status.as_u16() < 400 {
                tracing::debug!(
                    request_id = %request_id,
                    provider = %provider.name,
                    status = %status,
                    "Streaming upstream response to caller"
                );
                return Ok(AttemptOutcome::Relay(relay_streaming(response)));
            }

            // Error statuses are buffered to completion: classification needs
            // the whole body, and a verbatim relay needs the same bytes.
            let upstream_headers = response.headers().clone();
            let body = response.text().await?;

            if is_quota_limit(&body) {
                tracing::warn!(
                    request_id = %request_id,
                    provider = %provider.name,
                    status = %status,
                    "Quota limit detected, invalidating provider and retrying"
                );
                state.registry.invalidate(&provider.name).await?;
                metrics
                    .provider_invalidations
                    .with_label_values(&[&provider.name])
                    .inc();
                metrics
                    .retry_count
                    .with_label_values(&[&provider.name])
                    .inc();
                return Ok(AttemptOutcome::QuotaLimited);
            }

            tracing::debug!(
                request_id = %request_id,
                provider = %provider.name,
                status = %status,
                "Relaying upstream error verbatim"
            );
            Ok(AttemptOutcome::Relay(relay_buffered(
                status,
                &upstream_headers,
                body,
            )))
        })
        .await
}

/// Basic health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let provider_info: Vec<ProviderInfo> = state
        .registry
        .providers()
        .iter()
        .map(|provider| ProviderInfo {
            name: provider.name.clone(),
        })
        .collect();

    Json(HealthResponse {
        status: "ok".to_string(),
        providers: provider_info.len(),
        provider_info,
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", encoder.format_type())
        .body(Body::from(buffer))
        .expect("metrics response"))
}
