//! Configuration management for the LLM router.
//!
//! Configuration comes from a YAML file with environment variable expansion,
//! or directly from the `PROVIDERS_JSON` environment variable for zero-file
//! deployments. Environment variables always win over file values.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file path, overridable via `CONFIG_PATH`.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ordered list of upstream providers. Order is significant: it is the
    /// priority order used for selection, not a rotation.
    pub providers: Vec<ProviderConfig>,

    /// Server configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Connection URL for the availability store. When absent, an in-process
    /// store is used and invalidations are not shared across instances.
    #[serde(default)]
    pub redis_url: Option<String>,
}

/// Configuration for a single upstream provider.
///
/// Accepts both snake_case and the camelCase field names used by older
/// deployments (`baseURL`, `apiKey`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name (unique; used as the availability store key suffix)
    pub name: String,

    /// Origin to which paths are forwarded
    #[serde(alias = "baseURL")]
    pub base_url: String,

    /// Bearer credential injected into every forwarded request
    #[serde(alias = "apiKey")]
    pub api_key: String,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// Environment variables referenced as `${VAR}` or `${VAR:-default}` in the
    /// file are expanded before parsing.
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let expanded = expand_env_vars(&content);

        let config: AppConfig = serde_yaml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Resolve the effective configuration for this process.
    ///
    /// Reads the config file when present, then applies environment overrides
    /// (`PROVIDERS_JSON`, `HOST`, `PORT`, `REDIS_URL`). A missing file is fine
    /// as long as `PROVIDERS_JSON` supplies the provider list.
    pub fn resolve() -> Result<Self> {
        let path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::load(&path)?
        } else {
            AppConfig {
                providers: vec![],
                server: ServerConfig::default(),
                redis_url: None,
            }
        };

        config.apply_env_overrides()?;

        if config.providers.is_empty() {
            bail!(
                "No providers configured: provide '{}' or set PROVIDERS_JSON",
                path
            );
        }

        Ok(config)
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var("PROVIDERS_JSON") {
            self.providers =
                serde_json::from_str(&raw).context("Failed to parse PROVIDERS_JSON")?;
        }

        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }

        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(url) = std::env::var("REDIS_URL") {
            self.redis_url = Some(url);
        }

        Ok(())
    }
}

/// Expand environment variables in configuration content.
///
/// Supports patterns: ${VAR}, ${VAR:-default}, ${VAR:default}
fn expand_env_vars(content: &str) -> String {
    let re = Regex::new(r#"\$\{([^}:]+)(?::?-?([^}]*))?\}"#).unwrap();

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
    })
    .to_string()
}
