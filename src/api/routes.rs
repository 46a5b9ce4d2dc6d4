use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware, session_middleware};

use super::handlers::{auth, movies, pages, users};
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(pages::health_check))
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        // Accounts
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route(
            "/users/profile",
            get(users::profile_form).post(users::update_profile),
        )
        .route("/users/delete", post(users::delete_user))
        // Movies
        .route("/search", get(movies::search).post(movies::search_submit))
        .route("/movies/like", post(movies::like))
        .route("/watchlist", get(movies::watchlist))
        .route(
            "/movies/:id/remove_watchlist",
            post(movies::remove_from_watchlist),
        )
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .with_state(state)
}
