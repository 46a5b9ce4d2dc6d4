use redis::AsyncCommands;
use redis::Client;

use crate::db::session::{SessionData, SessionId, SessionStore};
use crate::error::AppError;
use crate::error::AppResult;

/// Creates a Redis client for session storage
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

fn session_key(id: &SessionId) -> String {
    format!("session:{}", id)
}

/// Session records stored as JSON strings with a sliding TTL
///
/// Both `load` and `save` reset the expiry to `ttl` seconds.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_client: Client,
    ttl: u64,
}

impl RedisSessionStore {
    pub fn new(redis_client: Client, ttl: u64) -> Self {
        Self { redis_client, ttl }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &SessionId) -> AppResult<Option<SessionData>> {
        let key = session_key(id);
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(&key).await?;

        match stored {
            Some(json) => {
                // Reading a session keeps it alive as long as writing one does
                let _: () = redis::cmd("EXPIRE")
                    .arg(&key)
                    .arg(self.ttl)
                    .query_async(&mut conn)
                    .await?;

                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Session deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: &SessionId, data: &SessionData) -> AppResult<()> {
        let json = serde_json::to_string(data)
            .map_err(|e| AppError::Internal(format!("Session serialization error: {}", e)))?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(session_key(id), json, self.ttl).await?;

        tracing::debug!(session = %id, ttl = self.ttl, "Session saved");
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(session_key(id)).await?;
        Ok(())
    }
}
