//! Upstream forwarding.
//!
//! The forwarder turns an inbound request descriptor and a selected provider
//! into an outbound call, and relays the upstream response back as an axum
//! response. It deliberately treats every HTTP status as transport success;
//! only network-level failures surface as errors.

use crate::api::models::Provider;
use crate::core::{AppError, Result};
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::Response,
};
use bytes::Bytes;
use futures::TryStreamExt;

/// Inbound request headers that must not be forwarded upstream.
///
/// `host` and `content-length` are rewritten by the client for the new target,
/// `connection` is hop-by-hop, and `accept-encoding` is dropped so upstream
/// error bodies arrive uncompressed and classifiable.
const STRIPPED_REQUEST_HEADERS: [&str; 4] =
    ["host", "connection", "content-length", "accept-encoding"];

/// Upstream response headers that must not be relayed to the caller; the
/// server recomputes framing for the relayed body.
const STRIPPED_RESPONSE_HEADERS: [&str; 3] = ["content-length", "transfer-encoding", "connection"];

/// Everything needed to replay one inbound request against a provider.
///
/// The body is buffered once up front so that retry attempts against
/// different providers replay identical bytes.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Original path including the query string, forwarded unchanged.
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Build the outbound header set for a provider.
///
/// Inbound headers are passed through unexamined except for the hop-by-hop
/// set, and `Authorization` is overwritten with the provider's credential.
pub fn build_upstream_headers(inbound: &HeaderMap, api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (name, value) in inbound {
        // HeaderName is always lowercase, so a plain contains check suffices.
        if STRIPPED_REQUEST_HEADERS.contains(&name.as_str()) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|e| AppError::Internal(format!("Provider API key is not a valid header: {}", e)))?;
    headers.insert(header::AUTHORIZATION, bearer);

    Ok(headers)
}

/// Issue the upstream call for one attempt.
///
/// All HTTP status codes (including 4xx/5xx) return `Ok`; only transport
/// failures (connect, DNS, reset) return `Err`. The shared client carries no
/// request timeout, so long-running upstream streams are never cut off.
pub async fn forward(
    client: &reqwest::Client,
    descriptor: &RequestDescriptor,
    provider: &Provider,
) -> Result<reqwest::Response> {
    let url = format!("{}{}", provider.base_url, descriptor.path_and_query);
    let headers = build_upstream_headers(&descriptor.headers, &provider.api_key)?;

    let response = client
        .request(descriptor.method.clone(), url)
        .headers(headers)
        .body(descriptor.body.clone())
        .send()
        .await?;

    Ok(response)
}

/// Relay a successful upstream response as a byte stream.
///
/// The body is piped through without buffering, which keeps incremental
/// token streams incremental. If the caller disconnects, dropping the axum
/// body drops the reqwest response and releases the upstream connection.
pub fn relay_streaming(response: reqwest::Response) -> Response {
    let status = response.status();
    let upstream_headers = response.headers().clone();

    let stream = response.bytes_stream().map_err(|e| {
        tracing::debug!(error = %e, "Upstream stream ended with error");
        e
    });

    let mut builder = Response::builder().status(status);
    if let Some(headers) = builder.headers_mut() {
        copy_response_headers(&upstream_headers, headers);
    }

    builder
        .body(Body::from_stream(stream))
        .expect("streaming relay response")
}

/// Relay a fully-buffered upstream response verbatim.
pub fn relay_buffered(status: StatusCode, upstream_headers: &HeaderMap, body: String) -> Response {
    let mut builder = Response::builder().status(status);
    if let Some(headers) = builder.headers_mut() {
        copy_response_headers(upstream_headers, headers);
    }

    builder
        .body(Body::from(body))
        .expect("buffered relay response")
}

fn copy_response_headers(upstream: &HeaderMap, relayed: &mut HeaderMap) {
    for (name, value) in upstream {
        if STRIPPED_RESPONSE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        relayed.append(name.clone(), value.clone());
    }
}
