use app_state::AppSettings;
use axum::extract::FromRef;
use common_services::api::notification::email::EmailDispatcher;
use common_services::blob_store::BlobStore;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiContext {
    pub pool: SqlitePool,
    pub settings: AppSettings,
    pub blobs: Arc<dyn BlobStore>,
    pub mailer: EmailDispatcher,
}

// Lets extractors and middleware pull out just the part of the state they need.
impl FromRef<ApiContext> for SqlitePool {
    fn from_ref(state: &ApiContext) -> Self {
        state.pool.clone()
    }
}

impl FromRef<ApiContext> for AppSettings {
    fn from_ref(state: &ApiContext) -> Self {
        state.settings.clone()
    }
}

impl FromRef<ApiContext> for EmailDispatcher {
    fn from_ref(state: &ApiContext) -> Self {
        state.mailer.clone()
    }
}
