use anyhow::Context;
use serde::Deserialize;

/// Ten years. Keeps `iat + ttl` well inside the representable date range.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 366 * 10;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Tokens never expire unless this is set.
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "messagely".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "messagely-users".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref())?,
        };
        Ok(Self {
            database_url,
            max_connections,
            jwt,
        })
    }
}

/// Unset or empty means "no expiry"; anything else must be a positive minute count
/// no larger than [`MAX_TTL_MINUTES`].
pub fn parse_ttl_minutes(raw: Option<&str>) -> anyhow::Result<Option<i64>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let minutes = raw
        .parse::<i64>()
        .with_context(|| format!("JWT_TTL_MINUTES is not a number: {:?}", raw))?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!(
            "JWT_TTL_MINUTES must be between 1 and {}, got {}",
            MAX_TTL_MINUTES,
            minutes
        );
    }
    Ok(Some(minutes))
}
