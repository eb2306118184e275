use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::ToSchema;

use crate::models::{AreaStatus, HealthStatus};

// -- JWT Claims --

/// Session token claims. Shared by the API (issuing and middleware) and the
/// client, which only reads them back for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub cpf: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub nome: String,
    pub email: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub msg: String,
    pub user: UserProfile,
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

// -- Generic replies --

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub msg: String,
    #[serde(rename = "insertedId")]
    pub inserted_id: i64,
}

/// Body of every 500 reply: the raw failure message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

// -- Stats --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_arvores: i64,
    pub total_areas: i64,
    pub total_usuarios: i64,
    pub arvores_saudaveis: i64,
}

// -- Trees --

/// Body of `POST /trees` and `PUT /trees/{id}`. Every field is optional on the
/// wire so that missing values surface as validation errors, not parse errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TreeRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub usuario_id: Option<i64>,
    #[serde(rename = "treeName")]
    pub tree_name: Option<String>,
    #[serde(rename = "popularName")]
    pub popular_name: Option<String>,
    /// `Saudável`, `Doente` or `Morrendo`.
    pub lifecondition: Option<String>,
    pub location: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(rename = "plantingDate")]
    pub planting_date: Option<String>,
    pub altura: Option<f64>,
    pub diametro: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "imagemUrl")]
    pub imagem_url: Option<String>,
    #[serde(rename = "areaVerdeId", default, deserialize_with = "lenient_id")]
    pub area_verde_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TreeResponse {
    pub id: i64,
    pub nome_cientifico: String,
    pub nome_popular: Option<String>,
    pub data_plantio: NaiveDate,
    pub estado_saude: HealthStatus,
    pub localizacao: String,
    pub altura: Option<f64>,
    pub diametro: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub imagem_url: Option<String>,
    pub area_verde_id: Option<i64>,
    pub usuario_id: i64,
    pub created_at: DateTime<Utc>,
    pub nome_registrante: String,
    pub nome_area: Option<String>,
}

// -- Green areas --

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AreaRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub usuario_id: Option<i64>,
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub localizacao: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub responsavel: Option<String>,
    /// `Ativa` (default), `Em Manutenção` or `Planejada`.
    pub status: Option<String>,
    #[serde(rename = "imagemUrl")]
    pub imagem_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AreaResponse {
    pub id: i64,
    pub nome: String,
    pub descricao: Option<String>,
    pub localizacao: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub responsavel: Option<String>,
    pub status: AreaStatus,
    pub imagem_url: Option<String>,
    pub usuario_id: i64,
    pub created_at: DateTime<Utc>,
    pub nome_registrante: String,
    pub total_arvores: i64,
}

/// Accepts an id as a JSON number or a numeric string (HTML selects post
/// strings). `null` and `""` both mean "no id".
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(i64),
        Str(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::Int(id)) => Ok(Some(id)),
        Some(Repr::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Repr::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid id '{}'", s))),
    }
}
