//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own catalog and
//! repeat-avoidance state.

use super::constants::*;
use super::fixtures::create_test_catalog;
use async_trait::async_trait;
use moodify_server::catalog::load_catalog;
use moodify_server::emotion::{DecodedImage, FaceAnalysisError, FaceAnalyzer, UnavailableFaceAnalyzer};
use moodify_server::recommend::Recommender;
use moodify_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Face analyzer that always reports the same emotion.
pub struct FixedFaceAnalyzer(pub &'static str);

#[async_trait]
impl FaceAnalyzer for FixedFaceAnalyzer {
    async fn analyze(&self, _image: &DecodedImage) -> Result<String, FaceAnalysisError> {
        Ok(self.0.to_string())
    }
}

/// Test server instance with an isolated catalog
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    // Private fields - keep resources alive until drop
    _temp_catalog_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server without a facial analysis service, so every
    /// webcam request degrades to `neutral`.
    pub async fn spawn() -> Self {
        Self::spawn_with_face_analyzer(Arc::new(UnavailableFaceAnalyzer)).await
    }

    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Writes the fixture catalog to a temporary directory
    /// 2. Loads it the same way the server binary does
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if the catalog cannot be loaded, binding fails or the server
    /// doesn't become ready within timeout.
    pub async fn spawn_with_face_analyzer(face_analyzer: Arc<dyn FaceAnalyzer>) -> Self {
        let (temp_catalog_dir, catalog_path) =
            create_test_catalog().expect("Failed to create test catalog");
        let catalog = load_catalog(&catalog_path).expect("Failed to load test catalog");
        let recommender = Arc::new(Recommender::new(Arc::new(catalog)));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            bind_address: "127.0.0.1".to_string(),
            requests_logging_level: RequestsLoggingLevel::None,
            ..ServerConfig::default()
        };
        let app = make_app(config, recommender, face_analyzer);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            _temp_catalog_dir: temp_catalog_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the `/` endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
