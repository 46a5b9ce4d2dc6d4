use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{user::DEFAULT_IMAGE_URL, NewUser, User, UserUpdate},
};

/// Validated signup input
#[derive(Debug, Clone)]
pub struct Signup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
}

/// Validated profile edit, authorized by the current password
#[derive(Debug, Clone)]
pub struct ProfileEdit {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub password: String,
    pub service_ids: Vec<i32>,
}

async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

fn image_or_default(image_url: Option<String>) -> String {
    image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string())
}

/// Creates an account with a hashed password
///
/// Fails with `AppError::Conflict` when the username or email is taken.
pub async fn sign_up(store: &dyn Store, signup: Signup, cost: u32) -> AppResult<User> {
    let password_hash = hash_password(signup.password, cost).await?;

    let user = store
        .create_user(NewUser {
            username: signup.username,
            email: signup.email,
            password_hash,
            image_url: image_or_default(signup.image_url),
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User signed up");
    Ok(user)
}

/// Finds the user with `username` whose password matches
pub async fn authenticate(store: &dyn Store, username: &str, password: &str) -> AppResult<Option<User>> {
    let Some(user) = store.user_by_username(username).await? else {
        return Ok(None);
    };

    if verify_password(password.to_string(), user.password_hash.clone()).await? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Applies a profile edit if the password re-verifies
///
/// Returns `Ok(None)` on a wrong password. The user's service subscriptions
/// are replaced by `edit.service_ids`.
pub async fn update_profile(store: &dyn Store, user: &User, edit: ProfileEdit) -> AppResult<Option<User>> {
    if authenticate(store, &user.username, &edit.password).await?.is_none() {
        tracing::info!(user_id = user.id, "Profile update rejected: bad password");
        return Ok(None);
    }

    let updated = store
        .update_user(
            user.id,
            UserUpdate {
                username: edit.username,
                email: edit.email,
                image_url: image_or_default(edit.image_url),
            },
        )
        .await?;
    store.set_user_services(user.id, &edit.service_ids).await?;

    tracing::info!(
        user_id = user.id,
        services = edit.service_ids.len(),
        "Profile updated"
    );
    Ok(Some(updated))
}

/// Deletes the account along with its likes and subscriptions
pub async fn delete_account(store: &dyn Store, user_id: i32) -> AppResult<()> {
    if store.delete_user(user_id).await? {
        tracing::info!(user_id, "User deleted");
    }
    Ok(())
}
