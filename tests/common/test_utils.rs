use super::mocks::MockLlmClient;
use axum::{Router, body::Bytes};
use prompt_gateway::{
    config::ServerConfig,
    server::{AppState, build_router},
};
use std::sync::Arc;
use tempfile::TempDir;

pub const INDEX_HTML: &str = "<!doctype html><title>Prompt</title><h1>Ask the model</h1>";

/// Create a static directory holding a landing page and one asset
pub fn create_static_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    std::fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();
    std::fs::create_dir(dir.path().join("js")).unwrap();
    std::fs::write(dir.path().join("js").join("app.js"), "console.log('ready');").unwrap();
    dir
}

/// Create a server configuration pointing at `static_dir`
pub fn create_test_server_config(static_dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        static_dir: static_dir.path().to_path_buf(),
        shutdown_grace_secs: 5,
        ..ServerConfig::default()
    }
}

/// Build the full router around a mock backend. The returned `TempDir`
/// must outlive the router.
pub fn create_test_app(llm: MockLlmClient) -> (Router, TempDir) {
    let static_dir = create_static_dir();
    let config = create_test_server_config(&static_dir);

    let app_state = AppState {
        llm: Arc::new(llm),
        index_html: Bytes::from_static(INDEX_HTML.as_bytes()),
    };

    (build_router(app_state, &config), static_dir)
}
