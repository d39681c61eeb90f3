use crate::runner::context::context_utils::{create_test_database, create_test_settings};
use app_state::AppSettings;
use color_eyre::eyre::{Result, eyre};
use reqwest::Client;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The main context for our integration tests.
#[allow(dead_code)]
pub struct TestContext {
    pub pool: SqlitePool,
    pub settings: AppSettings,
    pub http_client: Client,
    // Dropped with the context
    temp_dir: TempDir,
    api_handle: JoinHandle<()>,
}

impl TestContext {
    /// Starts the API on a random local port, backed by a throwaway database and media root.
    pub async fn new() -> Result<Self> {
        info!("Setting up test environment...");
        let temp_dir = tempfile::tempdir()?;

        // 1. Settings and database live in the temp dir
        let settings_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("assets/settings.yaml")
            .canonicalize()?;
        let mut settings = create_test_settings(&settings_path, temp_dir.path())?;
        let pool = create_test_database(&settings, temp_dir.path()).await?;

        // 2. Bind first so the public URL is known before the server starts
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        settings.api.port = address.port();
        settings.api.public_url = format!("http://{address}");

        // 3. Spawn the API
        let api_pool = pool.clone();
        let api_settings = settings.clone();
        let api_handle = tokio::spawn(async move {
            if let Err(e) = api::serve_with_listener(listener, api_pool, api_settings).await {
                error!("API server failed: {}", e);
            }
        });

        // 4. Wait for the API to be ready to accept traffic
        let http_client = Client::new();
        Self::wait_for_healthy_api(&settings, &http_client).await?;

        info!("Test environment is ready.");
        Ok(Self {
            pool,
            settings,
            http_client,
            temp_dir,
            api_handle,
        })
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.api.public_url)
    }

    /// Polls the `/health` endpoint until it receives a successful response or times out.
    async fn wait_for_healthy_api(settings: &AppSettings, http_client: &Client) -> Result<()> {
        for attempt in 1..=20 {
            info!("Health check attempt {}...", attempt);
            let health_url = format!("{}/health", &settings.api.public_url);
            match http_client.get(&health_url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("API is healthy!");
                    return Ok(());
                }
                Ok(response) => {
                    warn!(
                        "API health check returned non-success status: {}",
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("API health check failed: {:?}. Retrying...", e);
                }
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        Err(eyre!(
            "API did not become healthy within the timeout period."
        ))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.api_handle.abort();
        info!("Teardown complete.");
    }
}
