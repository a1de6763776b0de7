use std::net::SocketAddr;
use std::sync::Arc;

use benefits360_api::config::Config;
use benefits360_api::db::Database;
use benefits360_api::db_storage::PgTabularBackend;
use benefits360_api::handlers::{self, AppState};
use benefits360_api::reconciler::SchemaReconciler;
use benefits360_api::services::SearchService;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Database connection for profile lookups.
/// - The vector search client (when configured).
/// - HTTP routes and middleware (CORS, body limit, rate limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "benefits360_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::with_timeout(&config.database_url, config.backend_timeout()).await?;
    tracing::info!("Database connection pool established");

    let backend = PgTabularBackend::new(db.pool.clone(), config.backend_timeout());
    let profiles = SchemaReconciler::new(
        backend,
        &config.primary_profile_table,
        &config.secondary_profile_table,
    );

    let search = SearchService::from_config(&config)?;
    if search.is_enabled() {
        tracing::info!("Vector search client initialized");
    } else {
        tracing::warn!("Vector search disabled; /search will answer 501");
    }

    let app_state = Arc::new(AppState {
        config: config.clone(),
        search,
        profiles,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let app = handlers::build_router(app_state)
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {} (api prefix {})", addr, config.api_prefix);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
