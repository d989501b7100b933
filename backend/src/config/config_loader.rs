use anyhow::{Context, Result, bail};
use std::str::FromStr;

use super::{
    config_model::{BackendServer, Database, DotEnvyConfig, SessionConfig},
    stage::Stage,
};

pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 60 * 60 * 24;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: parse_env("SERVER_PORT_BACKEND")?,
        body_limit: parse_env("SERVER_BODY_LIMIT")?,
        timeout: parse_env("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required_env("DATABASE_URL")?,
    };

    let secret = required_env("SESSION_SECRET")?;
    if secret.len() < 32 {
        bail!("SESSION_SECRET must be at least 32 bytes");
    }

    let ttl_seconds = match std::env::var("SESSION_TTL_SECONDS") {
        Ok(_) => parse_env("SESSION_TTL_SECONDS")?,
        Err(_) => DEFAULT_SESSION_TTL_SECONDS,
    };
    if ttl_seconds <= 0 {
        bail!("SESSION_TTL_SECONDS must be positive");
    }

    Ok(DotEnvyConfig {
        backend_server,
        database,
        session: SessionConfig {
            secret,
            ttl_seconds,
        },
        stage: get_stage(),
    })
}

/// Only the store location, for tools that never serve HTTP.
pub fn database_url() -> Result<String> {
    dotenvy::dotenv().ok();
    required_env("DATABASE_URL")
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn required_env(key: &str) -> Result<String> {
    let value = std::env::var(key).with_context(|| format!("{key} is missing"))?;
    if value.trim().is_empty() {
        bail!("{key} is empty");
    }
    Ok(value)
}

fn parse_env<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required_env(key)?
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} is invalid"))
}
