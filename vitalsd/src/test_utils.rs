//! Test helpers for building apps around a mock provider transport.

use crate::providers::http::MockHttpClient;
use crate::providers::build_provider_with_client;
use crate::{AppState, Config, build_router};
use axum_test::TestServer;

/// Defaults plus a credential, so analysis endpoints are enabled.
pub fn test_config() -> Config {
    Config {
        api_key: Some("sk-ant-test".to_string()),
        ..Default::default()
    }
}

/// Server whose provider calls go to `mock`. Keep a clone of the mock to queue replies and inspect calls.
pub fn create_test_app(config: Config, mock: MockHttpClient) -> TestServer {
    let provider = build_provider_with_client(&config, mock);
    let state = AppState::builder().config(config).maybe_provider(provider).build();
    TestServer::new(build_router(state).expect("Failed to build router")).expect("Failed to create test server")
}

/// Server with no provider at all, as when no credential is configured.
pub fn create_test_app_without_credential(config: Config) -> TestServer {
    let state = AppState::builder().config(config).build();
    TestServer::new(build_router(state).expect("Failed to build router")).expect("Failed to create test server")
}
