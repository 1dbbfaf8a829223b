//! Business logic for the LLM router.
//!
//! - Availability store (Redis-backed or in-process)
//! - Provider registry (priority selection + invalidation)
//! - Quota-limit detection

pub mod availability;
pub mod quota;
pub mod registry;

// Re-export commonly used types
pub use availability::{AvailabilityStore, MemoryStore, RedisStore};
pub use quota::is_quota_limit;
pub use registry::{ProviderRegistry, INVALIDATION_TTL, INVALID_KEY_PREFIX};
