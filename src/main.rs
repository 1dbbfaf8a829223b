//! LLM Router - Main entry point
//!
//! This binary loads configuration, connects the availability store, and runs
//! the HTTP server with the failover proxy mounted as the fallback route.

use anyhow::Result;
use chrono::Local;
use llm_router_rust::{
    core::{init_metrics, AppConfig},
    router,
    services::{AvailabilityStore, MemoryStore, ProviderRegistry, RedisStore},
    AppState, Provider,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Custom time formatter that uses local timezone (respects TZ environment variable)
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

fn init_tracing() {
    // Default filter: info everywhere, debug for this crate. Noise-suppression
    // for the HTTP stack is always appended, so a plain RUST_LOG=debug does
    // not drown the log in hyper frame chatter.
    let base_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,llm_router_rust=debug".to_string());
    let filter_str = format!("{},hyper=warn,h2=warn,reqwest=warn", base_filter);
    let filter = tracing_subscriber::EnvFilter::new(filter_str);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_timer(LocalTime))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    init_tracing();
    init_metrics();

    let config = AppConfig::resolve()?;

    let store: Arc<dyn AvailabilityStore> = match &config.redis_url {
        Some(url) => {
            tracing::info!("Connecting to availability store...");
            let store = RedisStore::connect(url).await?;
            tracing::info!("Availability store connected");
            Arc::new(store)
        }
        None => {
            tracing::warn!(
                "REDIS_URL not set; using in-process availability store \
                 (invalidations are not shared across instances)"
            );
            Arc::new(MemoryStore::new())
        }
    };

    let providers: Vec<Provider> = config.providers.iter().cloned().map(Provider::from).collect();
    for provider in &providers {
        tracing::info!(provider = %provider.name, base_url = %provider.base_url, "Registered provider");
    }

    let registry = ProviderRegistry::new(providers, store);

    let state = Arc::new(AppState {
        registry,
        http_client: create_http_client(),
    });

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Starting LLM router on {}", addr);
    tracing::info!("Health endpoint: /health");
    tracing::info!("Metrics endpoint: /metrics");
    tracing::info!("All other routes are proxied upstream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the shared HTTP client with connection pooling.
///
/// No request timeout is configured: upstream responses may stream for
/// arbitrarily long and must not be cut off by the proxy.
fn create_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .build()
        .expect("Failed to build HTTP client")
}
