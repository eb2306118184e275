use axum::{Json, extract::State};

use biourb_types::api::StatsResponse;

use crate::error::ApiError;
use crate::{AppState, db_call};

/// Registry totals, recomputed from the tables on every request.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses((status = 200, description = "Registry totals", body = StatsResponse))
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = db_call(&state, |db| db.stats()).await?;

    Ok(Json(StatsResponse {
        total_arvores: stats.trees,
        total_areas: stats.areas,
        total_usuarios: stats.users,
        arvores_saudaveis: stats.healthy_trees,
    }))
}
