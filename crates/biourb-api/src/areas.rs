use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info, warn};

use biourb_db::models::{AreaFields, AreaRow};
use biourb_types::api::{AreaRequest, AreaResponse, CreatedResponse, ErrorResponse, MessageResponse};
use biourb_types::models::AreaStatus;

use crate::error::ApiError;
use crate::middleware::Actor;
use crate::validate::{missing, optional, required, stored_timestamp};
use crate::{AppState, db_call};

fn area_fields(req: AreaRequest) -> Result<AreaFields, ApiError> {
    let (Some(nome), Some(localizacao)) = (required(req.nome), required(req.localizacao)) else {
        return Err(missing("Name and location are required."));
    };

    let status = match required(req.status) {
        Some(raw) => raw
            .parse::<AreaStatus>()
            .map_err(|e| ApiError::Validation(e.to_string()))?,
        None => AreaStatus::default(),
    };

    Ok(AreaFields {
        nome,
        descricao: optional(req.descricao),
        localizacao,
        latitude: req.latitude,
        longitude: req.longitude,
        responsavel: optional(req.responsavel),
        status,
        imagem_url: optional(req.imagem_url),
    })
}

#[utoipa::path(
    post,
    path = "/areas",
    tag = "areas",
    request_body = AreaRequest,
    responses(
        (status = 201, description = "Green area registered", body = CreatedResponse),
        (status = 400, description = "Missing or invalid field", body = MessageResponse),
        (status = 401, description = "Missing or invalid token, when authentication is required", body = MessageResponse),
        (status = 500, description = "Database failure, e.g. unknown user", body = ErrorResponse),
    )
)]
pub async fn create_area(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<AreaRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    // A token's user is the registrant; the body only names one when unauthenticated.
    let usuario_id = actor
        .0
        .or(req.usuario_id)
        .ok_or_else(|| missing("Name, location and user are required."))?;
    let fields = area_fields(req)?;

    let inserted_id = db_call(&state, move |db| db.insert_area(usuario_id, &fields)).await?;

    info!("Green area {} registered by user {}", inserted_id, usuario_id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            msg: "Green area registered successfully!".to_string(),
            inserted_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/areas",
    tag = "areas",
    responses((status = 200, description = "All areas, newest first", body = [AreaResponse]))
)]
pub async fn list_areas(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = db_call(&state, |db| db.list_areas()).await?;

    let areas: Vec<AreaResponse> = rows.into_iter().filter_map(area_response).collect();

    Ok(Json(areas))
}

#[utoipa::path(
    put,
    path = "/areas/{id}",
    tag = "areas",
    params(("id" = i64, Path, description = "Green area id")),
    request_body = AreaRequest,
    responses(
        (status = 200, description = "Updated; also returned when the id does not exist", body = MessageResponse),
        (status = 400, description = "Missing or invalid field", body = MessageResponse),
    )
)]
pub async fn update_area(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    actor: Actor,
    payload: Result<Json<AreaRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let fields = area_fields(req)?;

    let changed = db_call(&state, move |db| db.update_area(id, &fields)).await?;
    if changed == 0 {
        debug!("Update of green area {} matched no row", id);
    } else {
        info!("Green area {} updated (actor: {:?})", id, actor.0);
    }

    Ok(Json(MessageResponse::new("Green area updated successfully!")))
}

#[utoipa::path(
    delete,
    path = "/areas/{id}",
    tag = "areas",
    params(("id" = i64, Path, description = "Green area id")),
    responses((status = 200, description = "Deleted; also returned when the id does not exist", body = MessageResponse))
)]
pub async fn delete_area(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    actor: Actor,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let deleted = db_call(&state, move |db| db.delete_area(id)).await?;
    if deleted == 0 {
        debug!("Delete of green area {} matched no row", id);
    } else {
        info!("Green area {} deleted (actor: {:?})", id, actor.0);
    }

    Ok(Json(MessageResponse::new("Green area deleted successfully!")))
}

fn area_response(row: AreaRow) -> Option<AreaResponse> {
    let record = format!("green area {}", row.id);

    let status = match row.status.parse::<AreaStatus>() {
        Ok(status) => status,
        Err(e) => {
            warn!("Skipping {}: {}", record, e);
            return None;
        }
    };

    Some(AreaResponse {
        id: row.id,
        nome: row.nome,
        descricao: row.descricao,
        localizacao: row.localizacao,
        latitude: row.latitude,
        longitude: row.longitude,
        responsavel: row.responsavel,
        status,
        imagem_url: row.imagem_url,
        usuario_id: row.usuario_id,
        created_at: stored_timestamp(&row.created_at, &record),
        nome_registrante: row.nome_registrante,
        total_arvores: row.total_arvores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_active() {
        let fields = area_fields(AreaRequest {
            nome: Some("Parque 13 de Maio".into()),
            localizacao: Some("Boa Vista".into()),
            status: Some("".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(fields.status, AreaStatus::Active);
    }

    #[test]
    fn name_and_location_are_required() {
        let err = area_fields(AreaRequest {
            nome: Some("Sem local".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn free_text_status_is_refused() {
        let err = area_fields(AreaRequest {
            nome: Some("A".into()),
            localizacao: Some("B".into()),
            status: Some("Fechada".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("Fechada")));
    }
}
