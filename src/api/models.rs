//! Data models for the LLM router API.

use crate::core::config::ProviderConfig;
use serde::{Deserialize, Serialize};

/// An upstream provider selected for forwarding.
///
/// Immutable for the process lifetime; created once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    /// Unique provider name
    pub name: String,

    /// Origin to which the original path+query is appended
    pub base_url: String,

    /// Bearer credential injected into forwarded requests
    pub api_key: String,
}

impl From<ProviderConfig> for Provider {
    fn from(config: ProviderConfig) -> Self {
        Self {
            name: config.name,
            base_url: config.base_url,
            api_key: config.api_key,
        }
    }
}

/// Response for the health endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub providers: usize,
    pub provider_info: Vec<ProviderInfo>,
}

/// Per-provider information in the health response.
///
/// Deliberately name-only: base URLs and credentials stay out of the surface.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_config() {
        let config = ProviderConfig {
            name: "primary".to_string(),
            base_url: "https://api.primary.example".to_string(),
            api_key: "key-a".to_string(),
        };

        let provider = Provider::from(config);
        assert_eq!(provider.name, "primary");
        assert_eq!(provider.base_url, "https://api.primary.example");
        assert_eq!(provider.api_key, "key-a");
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            providers: 1,
            provider_info: vec![ProviderInfo {
                name: "primary".to_string(),
            }],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["providers"], 1);
        assert_eq!(json["provider_info"][0]["name"], "primary");
    }
}
