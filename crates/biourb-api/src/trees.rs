use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use biourb_db::models::{TreeFields, TreeRow};
use biourb_types::api::{CreatedResponse, ErrorResponse, MessageResponse, TreeRequest, TreeResponse};
use biourb_types::models::HealthStatus;

use crate::error::ApiError;
use crate::middleware::Actor;
use crate::validate::{missing, optional, planting_date, required, stored_timestamp};
use crate::{AppState, db_call};

/// Validate the mutable fields shared by create and update.
fn tree_fields(req: TreeRequest) -> Result<TreeFields, ApiError> {
    let (Some(nome_cientifico), Some(lifecondition), Some(localizacao), Some(date)) = (
        required(req.tree_name),
        required(req.lifecondition),
        required(req.location),
        required(req.planting_date),
    ) else {
        return Err(missing("Please provide all required fields."));
    };

    let estado_saude = lifecondition
        .parse::<HealthStatus>()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    Ok(TreeFields {
        nome_cientifico,
        nome_popular: optional(req.popular_name),
        data_plantio: planting_date(&date)?,
        estado_saude,
        localizacao,
        altura: req.altura,
        diametro: req.diametro,
        latitude: req.latitude,
        longitude: req.longitude,
        imagem_url: optional(req.imagem_url),
        area_verde_id: req.area_verde_id,
    })
}

#[utoipa::path(
    post,
    path = "/trees",
    tag = "trees",
    request_body = TreeRequest,
    responses(
        (status = 201, description = "Tree registered", body = CreatedResponse),
        (status = 400, description = "Missing or invalid field", body = MessageResponse),
        (status = 401, description = "Missing or invalid token, when authentication is required", body = MessageResponse),
        (status = 500, description = "Database failure, e.g. unknown user", body = ErrorResponse),
    )
)]
pub async fn create_tree(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<TreeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    // A token's user is the registrant; the body only names one when unauthenticated.
    let usuario_id = actor
        .0
        .or(req.usuario_id)
        .ok_or_else(|| missing("Please provide all required fields."))?;
    let fields = tree_fields(req)?;

    let inserted_id = db_call(&state, move |db| db.insert_tree(usuario_id, &fields)).await?;

    info!("Tree {} registered by user {}", inserted_id, usuario_id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            msg: "Tree registered successfully!".to_string(),
            inserted_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/trees",
    tag = "trees",
    responses((status = 200, description = "All trees, newest first", body = [TreeResponse]))
)]
pub async fn list_trees(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = db_call(&state, |db| db.list_trees()).await?;

    let trees: Vec<TreeResponse> = rows.into_iter().filter_map(tree_response).collect();

    Ok(Json(trees))
}

#[utoipa::path(
    put,
    path = "/trees/{id}",
    tag = "trees",
    params(("id" = i64, Path, description = "Tree id")),
    request_body = TreeRequest,
    responses(
        (status = 200, description = "Updated; also returned when the id does not exist", body = MessageResponse),
        (status = 400, description = "Missing or invalid field", body = MessageResponse),
    )
)]
pub async fn update_tree(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    actor: Actor,
    payload: Result<Json<TreeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let fields = tree_fields(req)?;

    let changed = db_call(&state, move |db| db.update_tree(id, &fields)).await?;
    if changed == 0 {
        debug!("Update of tree {} matched no row", id);
    } else {
        info!("Tree {} updated (actor: {:?})", id, actor.0);
    }

    Ok(Json(MessageResponse::new("Tree updated successfully!")))
}

#[utoipa::path(
    delete,
    path = "/trees/{id}",
    tag = "trees",
    params(("id" = i64, Path, description = "Tree id")),
    responses((status = 200, description = "Deleted; also returned when the id does not exist", body = MessageResponse))
)]
pub async fn delete_tree(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    actor: Actor,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let deleted = db_call(&state, move |db| db.delete_tree(id)).await?;
    if deleted == 0 {
        debug!("Delete of tree {} matched no row", id);
    } else {
        info!("Tree {} deleted (actor: {:?})", id, actor.0);
    }

    Ok(Json(MessageResponse::new("Tree deleted successfully!")))
}

fn tree_response(row: TreeRow) -> Option<TreeResponse> {
    let record = format!("tree {}", row.id);

    let estado_saude = match row.estado_saude.parse::<HealthStatus>() {
        Ok(status) => status,
        Err(e) => {
            warn!("Skipping {}: {}", record, e);
            return None;
        }
    };
    let data_plantio = match NaiveDate::parse_from_str(&row.data_plantio, "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            warn!("Skipping {}: corrupt data_plantio '{}': {}", record, row.data_plantio, e);
            return None;
        }
    };

    Some(TreeResponse {
        id: row.id,
        nome_cientifico: row.nome_cientifico,
        nome_popular: row.nome_popular,
        data_plantio,
        estado_saude,
        localizacao: row.localizacao,
        altura: row.altura,
        diametro: row.diametro,
        latitude: row.latitude,
        longitude: row.longitude,
        imagem_url: row.imagem_url,
        area_verde_id: row.area_verde_id,
        usuario_id: row.usuario_id,
        created_at: stored_timestamp(&row.created_at, &record),
        nome_registrante: row.nome_registrante,
        nome_area: row.nome_area,
    })
}
