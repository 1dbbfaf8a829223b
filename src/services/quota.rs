//! Quota/rate-limit detection.
//!
//! Upstreams phrase usage-limit rejections inconsistently, so detection is a
//! body-text heuristic rather than a status code check: a 429 carrying a
//! malformed-request message must not trigger failover, while a 400 whose body
//! mentions exhausted quota must.

/// Substrings that mark an upstream error body as a usage-limit rejection.
const QUOTA_SIGNATURES: [&str; 4] = ["rate limit", "quota", "daily limit", "insufficient_quota"];

/// Whether an upstream error body signals a quota/rate-limit condition.
///
/// Case-insensitive substring match; the HTTP status code is deliberately not
/// consulted.
pub fn is_quota_limit(body: &str) -> bool {
    let message = body.to_lowercase();
    QUOTA_SIGNATURES
        .iter()
        .any(|signature| message.contains(signature))
}
