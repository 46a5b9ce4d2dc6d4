use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";

/// An account. Personal service subscriptions live in their own relation.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never serialized
    pub password_hash: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`User`]; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub image_url: String,
}

/// Profile edits applied by the owning user
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub image_url: String,
}

/// Public view of a user, safe to render
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub image_url: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
        }
    }
}
