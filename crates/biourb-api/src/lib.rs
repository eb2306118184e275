pub mod areas;
pub mod auth;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod stats;
pub mod trees;
mod validate;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tracing::error;

use biourb_db::Database;
use biourb_types::api::{ErrorResponse, HealthResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Lifetime of issued session tokens.
    pub token_ttl: chrono::Duration,
}

/// Build the registry router. With `require_auth` set, the routes that create,
/// update or delete records demand a valid bearer token.
pub fn router(state: AppState, require_auth: bool) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/stats", get(stats::get_stats))
        .route("/trees", get(trees::list_trees))
        .route("/areas", get(areas::list_areas))
        .route("/health", get(health))
        .route("/api-docs", get(docs::swagger_ui))
        .route(docs::SPEC_PATH, get(docs::openapi_json));

    let mut write_routes = Router::new()
        .route("/trees", post(trees::create_tree))
        .route("/trees/{id}", put(trees::update_tree).delete(trees::delete_tree))
        .route("/areas", post(areas::create_area))
        .route("/areas/{id}", put(areas::update_area).delete(areas::delete_area));

    if require_auth {
        write_routes = write_routes.route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));
    }

    Router::new()
        .merge(public_routes)
        .merge(write_routes)
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 500, description = "Database unreachable", body = ErrorResponse),
    )
)]
async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    db_call(&state, |db| db.ping()).await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// Run a blocking database call off the async runtime.
pub(crate) async fn db_call<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}
