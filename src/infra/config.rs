use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;
use url::Url;

use super::error::InfraError;

/// Upper bound for `OAUTH_STATE_TTL_MINUTES` (one day).
const MAX_OAUTH_STATE_TTL_MINUTES: i64 = 24 * 60;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub cors_origin: HeaderValue,
    /// Where the OAuth callback sends the browser once the handshake is done.
    pub app_redirect_url: Url,
    pub oauth_state_ttl: Duration,
}

pub struct TwitterConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub callback_url: Url,
    /// App-only token used for profile lookups.
    pub bearer_token: SecretString,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );
        let database_url: String = get_env("DATABASE_URL");
        let database_max_connections: u32 = get_env_default("DATABASE_MAX_CONNECTIONS", 5);
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid { var: "CORS_ORIGIN" })?;
        let app_redirect_url: Url = get_env("APP_REDIRECT_URL");
        let oauth_state_ttl_minutes: i64 = get_env_default("OAUTH_STATE_TTL_MINUTES", 10);

        Ok(Self {
            bind_addr,
            database_url,
            database_max_connections,
            redis_url,
            cors_origin,
            app_redirect_url,
            oauth_state_ttl: oauth_state_ttl(oauth_state_ttl_minutes)?,
        })
    }
}

fn oauth_state_ttl(minutes: i64) -> Result<Duration, InfraError> {
    if !(1..=MAX_OAUTH_STATE_TTL_MINUTES).contains(&minutes) {
        return Err(InfraError::ConfigInvalid {
            var: "OAUTH_STATE_TTL_MINUTES",
        });
    }
    Ok(Duration::minutes(minutes))
}

impl TwitterConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: get_env("TWITTER_CLIENT_ID"),
            client_secret: SecretString::new(get_env::<String>("TWITTER_CLIENT_SECRET").into()),
            callback_url: get_env("TWITTER_CALLBACK_URL"),
            bearer_token: SecretString::new(get_env::<String>("TWITTER_BEARER_TOKEN").into()),
        }
    }
}
