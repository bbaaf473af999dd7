/*
[INPUT]:  Mock server requirements for store-level tests
[OUTPUT]: Shared fixtures: mock server, signed-in app, envelopes
[POS]:    Test infrastructure - shared across app integration tests
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for meshcraft-app tests

#![allow(dead_code)]

use std::sync::Arc;

use meshcraft_adapter::{ClientConfig, MeshcraftClient, SessionManager};
use meshcraft_app::App;
use meshcraft_app::config::AppConfig;
use meshcraft_app::state::MemoryStore;
use wiremock::MockServer;

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Config pointing API and image proxy at the mock server
pub fn config_for(server: &MockServer) -> AppConfig {
    let yaml = format!(
        "api:\n  base_url: \"{}\"\npolling:\n  printing_ms: 20\n  idle_ms: 200\n",
        server.uri()
    );
    AppConfig::from_yaml(&yaml).expect("config")
}

/// App backed by the real HTTP client and in-memory storage
pub fn app_for(server: &MockServer) -> (App<MeshcraftClient>, Arc<MemoryStore>) {
    let config = config_for(server);
    let session = SessionManager::new();
    let client = MeshcraftClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init")
        .with_session(session.clone());
    let storage = Arc::new(MemoryStore::new());
    let app = App::new(Arc::new(client), session, storage.clone(), &config).expect("app");
    (app, storage)
}

pub fn ok_envelope(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "success": true, "data": data })
}

pub fn printer_json(device_id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "deviceId": device_id,
        "deviceName": "R1-ABC123",
        "status": status,
    })
}
