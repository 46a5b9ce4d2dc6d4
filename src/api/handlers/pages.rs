use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension,
};
use serde::Serialize;

use crate::{
    api::{
        views::{current_user, render, render_with_status, NoContent},
        AppState,
    },
    error::AppResult,
    middleware::Session,
};

#[derive(Debug, Serialize)]
pub struct AboutPage {
    pub about: &'static str,
}

const ABOUT: &str = "Search for movies, keep a watchlist, and see which of your \
                     streaming services carry each movie you want to watch.";

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let user = current_user(&state, &session).await?;
    Ok(render(&session, user.as_ref(), "home", NoContent {}).await)
}

pub async fn about(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let user = current_user(&state, &session).await?;
    Ok(render(&session, user.as_ref(), "about", AboutPage { about: ABOUT }).await)
}

pub async fn not_found(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let user = current_user(&state, &session).await?;
    Ok(render_with_status(
        StatusCode::NOT_FOUND,
        &session,
        user.as_ref(),
        "not_found",
        NoContent {},
    )
    .await)
}
