use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use tracing::info;

/// Secrets that ship in docs and sample `.env` files.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

const DEFAULT_ORIGINS: &str = "https://biourb.vercel.app,http://localhost:3001,http://localhost:5173";

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: TimeDelta,
    pub allowed_origins: Vec<String>,
    pub require_auth: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let jwt_secret = lookup("BIOURB_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("BIOURB_JWT_SECRET is unset or still a placeholder; set it in your .env file and restart");
        }

        let port = var("BIOURB_PORT", "3001")
            .parse()
            .context("BIOURB_PORT must be a port number")?;
        let ttl_secs: i64 = var("BIOURB_TOKEN_TTL_SECS", "3600")
            .parse()
            .context("BIOURB_TOKEN_TTL_SECS must be a number of seconds")?;
        if ttl_secs <= 0 {
            bail!("BIOURB_TOKEN_TTL_SECS must be positive, got {ttl_secs}");
        }
        let token_ttl = TimeDelta::try_seconds(ttl_secs)
            .with_context(|| format!("BIOURB_TOKEN_TTL_SECS {ttl_secs} is out of range"))?;
        let require_auth = matches!(
            var("BIOURB_REQUIRE_AUTH", "false").trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        );

        let allowed_origins = var("BIOURB_ALLOWED_ORIGINS", DEFAULT_ORIGINS)
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            host: var("BIOURB_HOST", "0.0.0.0"),
            port,
            db_path: var("BIOURB_DB_PATH", "biourb.db").into(),
            jwt_secret,
            token_ttl,
            allowed_origins,
            require_auth,
        })
    }
}
