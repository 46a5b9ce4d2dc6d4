use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Uri},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Serialize;

use crate::{
    api::{
        forms::{LikeForm, SearchForm},
        views::{current_user, redirect_with_flash, render, unauthorized},
        AppState,
    },
    db::FlashLevel,
    error::{AppError, AppResult},
    middleware::{RequestId, Session},
    models::{EnrichedMovie, SearchSnapshot, User},
    services::{movie_search, watchlist},
};

#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub results: Vec<EnrichedMovie>,
}

impl From<SearchSnapshot> for SearchPage {
    fn from(snapshot: SearchSnapshot) -> Self {
        Self {
            query: snapshot.query,
            results: snapshot.results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WatchlistPage {
    pub movies: Vec<watchlist::WatchlistEntry>,
}

/// Renders the cached search, or an empty one
async fn render_cached_search(session: &Session, user: &User) -> Response {
    let page = session
        .last_search()
        .await
        .map(SearchPage::from)
        .unwrap_or(SearchPage {
            query: String::new(),
            results: Vec::new(),
        });
    render(session, Some(user), "search", page).await
}

/// Runs a new search and replaces the session's cached results
async fn run_search(
    state: &AppState,
    session: &Session,
    user: &User,
    request_id: RequestId,
    query: &str,
) -> Response {
    match movie_search::search_snapshot(state.catalog.clone(), query).await {
        Ok(snapshot) => {
            session.replace_search(snapshot.clone()).await;
            render(session, Some(user), "search", SearchPage::from(snapshot)).await
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, query = %query, "Movie search failed");
            session.clear_search().await;
            session
                .flash(FlashLevel::Danger, "Movie search is unavailable right now.")
                .await;
            let page = SearchPage {
                query: query.trim().to_string(),
                results: Vec::new(),
            };
            render(session, Some(user), "search", page).await
        }
    }
}

/// `GET /search`: a `q` parameter starts a new search, otherwise the cached one is shown
pub async fn search(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchForm>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(unauthorized(&session).await);
    };

    Ok(match params.q {
        Some(query) => run_search(&state, &session, &user, request_id, &query).await,
        None => render_cached_search(&session, &user).await,
    })
}

/// `POST /search`: always a new search
pub async fn search_submit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(request_id): Extension<RequestId>,
    Form(form): Form<SearchForm>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(unauthorized(&session).await);
    };

    let query = form.q.unwrap_or_default();
    Ok(run_search(&state, &session, &user, request_id, &query).await)
}

/// Saves the movie picked from the cached search to the user's watchlist
///
/// The posted descriptor only selects a result. A missing or unreadable
/// descriptor, or one naming a movie outside the cached search, abandons the
/// write and re-renders the cached search results.
pub async fn like(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    form: Option<Form<LikeForm>>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(unauthorized(&session).await);
    };

    let descriptor = form.and_then(|Form(form)| form.movie).unwrap_or_default();
    let snapshot = session.last_search().await;
    let selected = match watchlist::parse_movie_descriptor(&descriptor)
        .and_then(|posted| watchlist::select_from_search(snapshot.as_ref(), &posted))
    {
        Ok(selected) => selected,
        Err(e) => {
            tracing::info!(user_id = user.id, error = %e, "Watchlist add abandoned");
            return Ok(render_cached_search(&session, &user).await);
        }
    };

    let added = watchlist::add_to_watchlist(state.store.as_ref(), user.id, &selected).await?;

    Ok(redirect_with_flash(
        &session,
        FlashLevel::Success,
        format!("Added {} to your watchlist", added.movie.title),
        "/watchlist",
    )
    .await)
}

pub async fn watchlist(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(unauthorized(&session).await);
    };

    let movies = watchlist::watchlist_for(state.store.as_ref(), user.id).await?;
    Ok(render(&session, Some(&user), "watchlist", WatchlistPage { movies }).await)
}

/// Path of the referring page, falling back to the watchlist
///
/// Only the path and query are kept, so a foreign referer cannot redirect
/// off-site.
fn referring_path(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| "/watchlist".to_string())
}

/// Removes one of the current user's likes
///
/// The id is parsed after the login check, so a malformed id is reported like
/// any other like the user does not hold.
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(movie_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(unauthorized(&session).await);
    };

    let removed = match movie_id.parse::<i32>() {
        Ok(id) => watchlist::remove_from_watchlist(state.store.as_ref(), user.id, id).await,
        Err(_) => Err(AppError::NotFound(format!("Movie {}", movie_id))),
    };

    match removed {
        Ok(()) => {
            session
                .flash(FlashLevel::Info, "Removed from your watchlist")
                .await
        }
        Err(AppError::NotFound(_)) => {
            tracing::warn!(user_id = user.id, movie_id = %movie_id, "Removal of a like the user does not own");
            session.flash(FlashLevel::Danger, "Access unauthorized.").await
        }
        Err(e) => return Err(e),
    }

    Ok(Redirect::to(&referring_path(&headers)).into_response())
}
