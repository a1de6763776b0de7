use crate::config::Config;
use crate::db_storage::PgTabularBackend;
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::reconciler::{SchemaReconciler, TabularBackend};
use crate::services::SearchService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
pub struct AppState<B = PgTabularBackend> {
    /// Application configuration.
    pub config: Config,
    /// Similarity search over the people index.
    pub search: SearchService,
    /// Two-tier profile lookup over the person tables.
    pub profiles: SchemaReconciler<B>,
}

/// Routes served by the API. Middleware (tracing, CORS, limits) is added by the caller.
pub fn build_router<B: TabularBackend + 'static>(state: Arc<AppState<B>>) -> Router {
    let api = Router::new()
        .route("/version", get(version))
        .route("/search", post(search_people::<B>))
        .route("/people/:person_id", get(get_person_profile::<B>));

    let prefix = state.config.api_prefix.clone();
    let router = Router::new().route("/health", get(health));
    // axum refuses to nest at the root
    let router = if prefix.is_empty() || prefix == "/" {
        router.merge(api)
    } else {
        router.nest(&prefix, api)
    };
    router.with_state(state)
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "benefits360-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET {prefix}/version
pub async fn version() -> Json<VersionOut> {
    Json(VersionOut::from_metadata())
}

/// POST {prefix}/search
///
/// Runs a similarity search and returns the normalized results in backend
/// rank order, echoing the query.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - JSON body with the query, index name and limit.
///
/// # Returns
///
/// * `Result<Json<VectorSearchResponse>, AppError>` - `501` when search is not configured,
///   `502` when the search backend fails.
pub async fn search_people<B: TabularBackend + 'static>(
    State(state): State<Arc<AppState<B>>>,
    Json(request): Json<VectorSearchRequest>,
) -> Result<Json<VectorSearchResponse>, AppError> {
    tracing::info!(
        "POST /search - query: {:?}, index: {}, limit: {:?}",
        request.query,
        request.index_name,
        request.limit
    );

    let response = state.search.search(&request).await?;

    tracing::info!(
        "Search for {:?} returned {} result(s)",
        response.query,
        response.results.len()
    );
    Ok(Json(response))
}

/// GET {prefix}/people/:person_id
///
/// Looks up one person in the primary profile table, falling back to the
/// secondary table, and returns the canonical profile.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `person_id` - Lookup key.
///
/// # Returns
///
/// * `Result<Json<ProfileResponse>, AppError>` - `404` when neither table has the
///   person, `502` when a table could not be queried.
pub async fn get_person_profile<B: TabularBackend + 'static>(
    State(state): State<Arc<AppState<B>>>,
    Path(person_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    tracing::info!("GET /people/{}", person_id);

    let response = state
        .profiles
        .lookup(&person_id)
        .await
        .with_context(|| format!("Profile lookup for {}", person_id))?;

    tracing::info!(
        "Profile {} served from {:?} source",
        person_id,
        response.source
    );
    Ok(Json(response))
}
