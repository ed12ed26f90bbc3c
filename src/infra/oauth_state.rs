use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use super::error::InfraError;
use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::identity_link::{OAuthStateData, OAuthStateStore as OAuthStateStoreTrait},
};

#[derive(Clone)]
pub struct OAuthStateStore {
    manager: ConnectionManager,
}

impl OAuthStateStore {
    pub async fn new(redis_url: &str) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;
        Ok(Self { manager })
    }

    fn state_key(state: &str) -> String {
        format!("oauth_state:{state}")
    }
}

/// Seconds for `SET EX`, never below one minute.
fn ttl_secs(ttl_minutes: i64) -> u64 {
    u64::try_from(ttl_minutes.max(1))
        .unwrap_or(1)
        .saturating_mul(60)
}

#[async_trait]
impl OAuthStateStoreTrait for OAuthStateStore {
    async fn store_state(
        &self,
        state: &str,
        data: &OAuthStateData,
        ttl_minutes: i64,
    ) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let key = Self::state_key(state);

        let json = serde_json::to_string(data)
            .map_err(|e| AppError::Internal(format!("Failed to serialize OAuth state: {e}")))?;

        let _: () = conn
            .set_ex(key, json, ttl_secs(ttl_minutes))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store OAuth state: {e}")))?;

        Ok(())
    }

    async fn consume_state(&self, state: &str) -> AppResult<Option<OAuthStateData>> {
        let mut conn = self.manager.clone();
        let key = Self::state_key(state);

        // Atomic GET + DEL so two callbacks racing on one state cannot both succeed
        let script = redis::Script::new(
            r#"
            local value = redis.call('GET', KEYS[1])
            if value then
                redis.call('DEL', KEYS[1])
            end
            return value
            "#,
        );

        let raw: Option<String> = script
            .key(&key)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to consume OAuth state: {e}")))?;

        raw.map(|value| {
            serde_json::from_str(&value)
                .map_err(|e| AppError::Internal(format!("Failed to parse OAuth state: {e}")))
        })
        .transpose()
    }
}
