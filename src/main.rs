//! travel-listings server entry point.
//!
//! Starts the Axum HTTP server with the listing and booking endpoints.

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use travel_listings::api;
use travel_listings::app_state::AppState;
use travel_listings::config::AppConfig;
use travel_listings::persistence::{MemoryStore, PostgresStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting travel-listings");

    // Build persistence layer
    let store: Arc<dyn Store> = if config.persistence_enabled {
        let postgres = PostgresStore::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        if config.run_migrations {
            postgres.migrate().await.context("running migrations")?;
            tracing::info!("database migrations applied");
        }
        Arc::new(postgres)
    } else {
        tracing::warn!("persistence disabled; records are kept in memory only");
        Arc::new(MemoryStore::new())
    };

    // Build router
    let router = api::build_router();
    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };
    let app = router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(store));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
