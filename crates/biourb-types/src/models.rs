use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Raised when a client sends a health or area status outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Condition of a registered tree.
///
/// Serialized with the labels the registry has always stored
/// (`Saudável`, `Doente`, `Morrendo`); the English names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum HealthStatus {
    #[serde(rename = "Saudável", alias = "Healthy")]
    Healthy,
    #[serde(rename = "Doente", alias = "Sick")]
    Sick,
    #[serde(rename = "Morrendo", alias = "Dying")]
    Dying,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 3] = [Self::Healthy, Self::Sick, Self::Dying];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "Saudável",
            Self::Sick => "Doente",
            Self::Dying => "Morrendo",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Saudável" | "Healthy" => Ok(Self::Healthy),
            "Doente" | "Sick" => Ok(Self::Sick),
            "Morrendo" | "Dying" => Ok(Self::Dying),
            other => Err(UnknownVariant {
                kind: "health status",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle label of a green area. New areas start out `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum AreaStatus {
    #[default]
    #[serde(rename = "Ativa", alias = "Active")]
    Active,
    #[serde(rename = "Em Manutenção", alias = "Under Maintenance")]
    UnderMaintenance,
    #[serde(rename = "Planejada", alias = "Planned")]
    Planned,
}

impl AreaStatus {
    pub const ALL: [AreaStatus; 3] = [Self::Active, Self::UnderMaintenance, Self::Planned];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Ativa",
            Self::UnderMaintenance => "Em Manutenção",
            Self::Planned => "Planejada",
        }
    }
}

impl fmt::Display for AreaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AreaStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Ativa" | "Active" => Ok(Self::Active),
            "Em Manutenção" | "Under Maintenance" => Ok(Self::UnderMaintenance),
            "Planejada" | "Planned" => Ok(Self::Planned),
            other => Err(UnknownVariant {
                kind: "area status",
                value: other.to_string(),
            }),
        }
    }
}
