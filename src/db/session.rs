use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use crate::{error::AppResult, models::SearchSnapshot};

/// Opaque identifier carried by the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a cookie value, rejecting anything that is not a UUID
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Danger,
}

/// A one-shot notice shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Everything remembered between requests of one browser session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Authenticated user, if any
    #[serde(default)]
    pub user_id: Option<i32>,
    /// Enriched results of the last search
    #[serde(default)]
    pub last_search: Option<SearchSnapshot>,
    #[serde(default)]
    pub flashes: Vec<Flash>,
}

/// Storage for session records
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &SessionId) -> AppResult<Option<SessionData>>;

    async fn save(&self, id: &SessionId, data: &SessionData) -> AppResult<()>;

    async fn remove(&self, id: &SessionId) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_parse() {
        let id = SessionId::generate();
        assert_eq!(SessionId::parse(&id.to_string()), Some(id));
        assert_eq!(SessionId::parse("not-a-uuid"), None);
    }

    #[test]
    fn test_session_data_tolerates_missing_fields() {
        let data: SessionData = serde_json::from_str(r#"{"user_id": 3}"#).unwrap();
        assert_eq!(data.user_id, Some(3));
        assert!(data.last_search.is_none());
        assert!(data.flashes.is_empty());
    }

    #[test]
    fn test_flash_level_serialization() {
        let json = serde_json::to_string(&FlashLevel::Danger).unwrap();
        assert_eq!(json, "\"danger\"");
    }
}
