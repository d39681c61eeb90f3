use crate::api_state::ApiContext;
use crate::create_router;
use app_state::AppSettings;
use axum::Router;
use axum::routing::get_service;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use common_services::api::notification::email::EmailDispatcher;
use common_services::blob_store::LocalBlobStore;
use common_services::email_transport::build_email_transport;
use http::{HeaderValue, header};
use sqlx::SqlitePool;
use std::iter::once;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Builds the shared state: blob store, email transport and dispatcher.
pub fn build_context(pool: SqlitePool, settings: AppSettings) -> Result<ApiContext> {
    let transport = build_email_transport(&settings.notifications)?;
    let mailer = EmailDispatcher::new(transport, &settings.notifications);
    Ok(ApiContext {
        pool,
        blobs: Arc::new(LocalBlobStore::new(&settings.storage.media_root)),
        settings,
        mailer,
    })
}

/// The full application: routes, `/media` static files and the HTTP layers.
pub fn build_app(context: ApiContext) -> Result<Router> {
    // --- CORS Configuration ---
    let allowed_origins: Vec<HeaderValue> = context
        .settings
        .api
        .allowed_origins
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::USER_AGENT,
            header::CACHE_CONTROL,
            header::PRAGMA,
        ]);

    // Blob keys are never reused, so media can be cached for good.
    let serve_dir = ServeDir::new(&context.settings.storage.media_root);
    let cache_layer = SetResponseHeaderLayer::if_not_present(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );

    let app = create_router(context)?
        .layer(TraceLayer::new_for_http().on_request(()))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(SetSensitiveRequestHeadersLayer::new(once(
            header::AUTHORIZATION,
        )))
        .nest_service("/media", get_service(serve_dir).layer(cache_layer));
    Ok(app)
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve(pool: SqlitePool, settings: AppSettings) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port)
        .parse()
        .map_err(|e| eyre!("Invalid address: {}", e))?;
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener, pool, settings).await
}

/// Serves on an already bound listener.
pub async fn serve_with_listener(
    listener: TcpListener,
    pool: SqlitePool,
    settings: AppSettings,
) -> Result<()> {
    info!("🚀 Initializing server...");
    tokio::fs::create_dir_all(&settings.storage.media_root).await?;
    let app = build_app(build_context(pool, settings)?)?;

    info!("📸 Server listening on http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
