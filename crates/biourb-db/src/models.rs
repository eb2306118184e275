//! Row types as they come out of SQLite: enums and dates stay as stored text
//! until the API layer parses them.

use biourb_types::models::{AreaStatus, HealthStatus};
use chrono::NaiveDate;

pub struct UserRow {
    pub id: i64,
    pub cpf: String,
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub is_admin: bool,
    pub created_at: String,
}

/// A tree joined with its registrant's name and, when linked, its area's name.
pub struct TreeRow {
    pub id: i64,
    pub nome_cientifico: String,
    pub nome_popular: Option<String>,
    pub data_plantio: String,
    pub estado_saude: String,
    pub localizacao: String,
    pub altura: Option<f64>,
    pub diametro: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub imagem_url: Option<String>,
    pub area_verde_id: Option<i64>,
    pub usuario_id: i64,
    pub created_at: String,
    pub nome_registrante: String,
    pub nome_area: Option<String>,
}

/// A green area joined with its registrant's name and its tree count.
pub struct AreaRow {
    pub id: i64,
    pub nome: String,
    pub descricao: Option<String>,
    pub localizacao: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub responsavel: Option<String>,
    pub status: String,
    pub imagem_url: Option<String>,
    pub usuario_id: i64,
    pub created_at: String,
    pub nome_registrante: String,
    pub total_arvores: i64,
}

pub struct StatsRow {
    pub trees: i64,
    pub areas: i64,
    pub users: i64,
    pub healthy_trees: i64,
}

/// Mutable columns of a tree, already validated.
#[derive(Debug, Clone)]
pub struct TreeFields {
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
}

/// Mutable columns of a green area, already validated.
#[derive(Debug, Clone)]
pub struct AreaFields {
    pub nome: String,
    pub descricao: Option<String>,
    pub localizacao: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub responsavel: Option<String>,
    pub status: AreaStatus,
    pub imagem_url: Option<String>,
}
