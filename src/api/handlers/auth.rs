use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Serialize;

use crate::{
    api::{
        forms::{FieldError, FormEcho, LoginForm, SignupForm},
        views::{current_user, redirect_with_flash, render, unauthorized},
        AppState,
    },
    db::FlashLevel,
    error::{AppError, AppResult},
    middleware::Session,
    services::accounts,
};

#[derive(Debug, Default, Serialize)]
pub struct AccountFormPage {
    pub form: FormEcho,
    pub errors: Vec<FieldError>,
}

pub async fn signup_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let user = current_user(&state, &session).await?;
    Ok(render(&session, user.as_ref(), "signup", AccountFormPage::default()).await)
}

/// Creates the account and logs it in
///
/// A taken username or email re-renders the form with a flash.
pub async fn signup(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let echo = form.echo();
    let signup = match form.validate() {
        Ok(signup) => signup,
        Err(errors) => {
            return Ok(render(&session, None, "signup", AccountFormPage { form: echo, errors }).await);
        }
    };

    match accounts::sign_up(state.store.as_ref(), signup, state.password_cost).await {
        Ok(user) => {
            session.log_in(user.id).await;
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::Conflict(message)) => {
            session.flash(FlashLevel::Danger, message).await;
            let page = AccountFormPage {
                form: echo,
                errors: Vec::new(),
            };
            Ok(render(&session, None, "signup", page).await)
        }
        Err(e) => Err(e),
    }
}

pub async fn login_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let user = current_user(&state, &session).await?;
    Ok(render(&session, user.as_ref(), "login", AccountFormPage::default()).await)
}

pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let echo = FormEcho {
        username: form.username.clone(),
        ..FormEcho::default()
    };

    if let Err(errors) = form.validate() {
        return Ok(render(&session, None, "login", AccountFormPage { form: echo, errors }).await);
    }

    match accounts::authenticate(state.store.as_ref(), form.username.trim(), &form.password).await? {
        Some(user) => {
            session.log_in(user.id).await;
            tracing::info!(user_id = user.id, "User logged in");
            Ok(redirect_with_flash(
                &session,
                FlashLevel::Success,
                format!("Hello, {}!", user.username),
                "/",
            )
            .await)
        }
        None => {
            session.flash(FlashLevel::Danger, "Invalid credentials.").await;
            let page = AccountFormPage {
                form: echo,
                errors: Vec::new(),
            };
            Ok(render(&session, None, "login", page).await)
        }
    }
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    if current_user(&state, &session).await?.is_none() {
        return Ok(unauthorized(&session).await);
    }

    session.log_out().await;
    Ok(redirect_with_flash(&session, FlashLevel::Info, "Come back soon!", "/").await)
}
