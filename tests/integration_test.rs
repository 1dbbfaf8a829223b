//! Integration tests for configuration wiring and the local endpoints.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use llm_router_rust::{
    core::AppConfig, AppState, MemoryStore, Provider, ProviderRegistry,
};
use serial_test::serial;
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

fn app_from_config(config: &AppConfig) -> axum::Router {
    let providers: Vec<Provider> = config
        .providers
        .iter()
        .cloned()
        .map(Provider::from)
        .collect();
    let registry = ProviderRegistry::new(providers, Arc::new(MemoryStore::new()));
    let state = Arc::new(AppState {
        registry,
        http_client: reqwest::Client::new(),
    });
    llm_router_rust::router(state)
}

#[test]
#[serial]
fn test_resolve_from_providers_json_without_file() {
    std::env::set_var("CONFIG_PATH", "definitely_missing.yaml");
    std::env::set_var(
        "PROVIDERS_JSON",
        r#"[{"name":"a","base_url":"https://a.example","api_key":"ka"},
            {"name":"b","base_url":"https://b.example","api_key":"kb"}]"#,
    );

    let config = AppConfig::resolve().unwrap();
    assert_eq!(config.providers.len(), 2);
    assert_eq!(config.providers[0].name, "a");
    assert_eq!(config.providers[1].name, "b");

    std::env::remove_var("CONFIG_PATH");
    std::env::remove_var("PROVIDERS_JSON");
}

#[test]
#[serial]
fn test_resolve_fails_without_any_providers() {
    std::env::set_var("CONFIG_PATH", "definitely_missing.yaml");
    std::env::remove_var("PROVIDERS_JSON");

    let result = AppConfig::resolve();
    assert!(result.is_err());

    std::env::remove_var("CONFIG_PATH");
}

#[test]
#[serial]
fn test_resolve_from_file_with_env_overrides() {
    let mut temp_file = tempfile::NamedTempFile::new().unwrap();
    temp_file
        .write_all(
            br#"
providers:
  - name: primary
    base_url: https://api.primary.example
    api_key: key-a

server:
  port: 8080
"#,
        )
        .unwrap();
    temp_file.flush().unwrap();

    std::env::set_var("CONFIG_PATH", temp_file.path().to_str().unwrap());
    std::env::remove_var("PROVIDERS_JSON");
    std::env::set_var("PORT", "9001");

    let config = AppConfig::resolve().unwrap();
    assert_eq!(config.providers.len(), 1);
    assert_eq!(config.providers[0].name, "primary");
    // Environment wins over the file value.
    assert_eq!(config.server.port, 9001);

    std::env::remove_var("CONFIG_PATH");
    std::env::remove_var("PORT");
}

#[tokio::test]
#[serial]
async fn test_health_endpoint_lists_providers() {
    let config = AppConfig {
        providers: vec![
            llm_router_rust::ProviderConfig {
                name: "primary".to_string(),
                base_url: "https://api.primary.example".to_string(),
                api_key: "ka".to_string(),
            },
            llm_router_rust::ProviderConfig {
                name: "fallback".to_string(),
                base_url: "https://api.fallback.example".to_string(),
                api_key: "kb".to_string(),
            },
        ],
        server: Default::default(),
        redis_url: None,
    };

    let app = app_from_config(&config);

    let request = Request::builder()
        .uri("/health")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["providers"], 2);
    assert_eq!(json["provider_info"][0]["name"], "primary");
    assert_eq!(json["provider_info"][1]["name"], "fallback");
    // Credentials never appear on the health surface.
    assert!(json["provider_info"][0].get("api_key").is_none());
}

#[tokio::test]
#[serial]
async fn test_metrics_endpoint_exposition() {
    let config = AppConfig {
        providers: vec![llm_router_rust::ProviderConfig {
            name: "primary".to_string(),
            base_url: "https://api.primary.example".to_string(),
            api_key: "ka".to_string(),
        }],
        server: Default::default(),
        redis_url: None,
    };

    let app = app_from_config(&config);

    let request = Request::builder()
        .uri("/metrics")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}
