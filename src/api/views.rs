use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::{
    db::{Flash, FlashLevel},
    error::AppResult,
    middleware::Session,
    models::{User, UserSummary},
};

use super::AppState;

/// Envelope every rendered page shares
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub page: &'static str,
    pub user: Option<UserSummary>,
    pub flashes: Vec<Flash>,
    #[serde(flatten)]
    pub content: T,
}

/// Page content for pages that only need the envelope
#[derive(Debug, Serialize)]
pub struct NoContent {}

/// Resolves the logged-in user
///
/// A session pointing at a deleted account is logged out.
pub async fn current_user(state: &AppState, session: &Session) -> AppResult<Option<User>> {
    let Some(user_id) = session.user_id().await else {
        return Ok(None);
    };

    let user = state.store.user_by_id(user_id).await?;
    if user.is_none() {
        tracing::warn!(user_id, "Session refers to a missing user");
        session.log_out().await;
    }
    Ok(user)
}

/// Renders `content` as the named page with the session's pending flashes
pub async fn render<T: Serialize>(
    session: &Session,
    user: Option<&User>,
    page: &'static str,
    content: T,
) -> Response {
    render_with_status(StatusCode::OK, session, user, page, content).await
}

pub async fn render_with_status<T: Serialize>(
    status: StatusCode,
    session: &Session,
    user: Option<&User>,
    page: &'static str,
    content: T,
) -> Response {
    let body = Page {
        page,
        user: user.map(UserSummary::from),
        flashes: session.take_flashes().await,
        content,
    };
    (status, Json(body)).into_response()
}

/// Flashes `message` and redirects to `to`
pub async fn redirect_with_flash(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
    to: &str,
) -> Response {
    session.flash(level, message).await;
    Redirect::to(to).into_response()
}

/// The response for a guarded route hit without a login
pub async fn unauthorized(session: &Session) -> Response {
    redirect_with_flash(session, FlashLevel::Danger, "Access unauthorized.", "/").await
}
