use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub cors_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let cors_origin = env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl_hours,
            cors_origin,
        })
    }
}

/// Settings for the `admin-watch` binary.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub api_url: String,
    pub email: String,
    pub password: String,
    pub poll_secs: u64,
    pub session_file: Option<String>,
}

impl WatchConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = env::var("UP_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
        let email = env::var("UP_ADMIN_EMAIL").context("UP_ADMIN_EMAIL is not set")?;
        let password = env::var("UP_ADMIN_PASSWORD").context("UP_ADMIN_PASSWORD is not set")?;
        let poll_secs = env::var("UP_POLL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(15);
        let session_file = env::var("UP_SESSION_FILE").ok().filter(|f| !f.is_empty());
        Ok(Self {
            api_url,
            email,
            password,
            poll_secs,
            session_file,
        })
    }
}
