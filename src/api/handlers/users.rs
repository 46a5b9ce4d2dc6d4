use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Serialize;
use std::collections::HashSet;

use crate::{
    api::{
        forms::{FieldError, FormEcho, ProfileForm},
        views::{current_user, redirect_with_flash, render, unauthorized},
        AppState,
    },
    db::FlashLevel,
    error::{AppError, AppResult},
    middleware::Session,
    models::User,
    services::accounts,
};

#[derive(Debug, Serialize)]
pub struct ServiceChoice {
    pub id: i32,
    pub name: String,
    pub icon_url: String,
    pub subscribed: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub form: FormEcho,
    pub services: Vec<ServiceChoice>,
    pub errors: Vec<FieldError>,
}

async fn profile_page(state: &AppState, user: &User, errors: Vec<FieldError>) -> AppResult<ProfilePage> {
    let subscribed: HashSet<i32> = state
        .store
        .user_service_ids(user.id)
        .await?
        .into_iter()
        .collect();

    let services = state
        .store
        .list_services()
        .await?
        .into_iter()
        .map(|service| ServiceChoice {
            subscribed: subscribed.contains(&service.id),
            id: service.id,
            name: service.name,
            icon_url: service.icon_url,
        })
        .collect();

    Ok(ProfilePage {
        form: FormEcho {
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
        },
        services,
        errors,
    })
}

pub async fn profile_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(unauthorized(&session).await);
    };

    let page = profile_page(&state, &user, Vec::new()).await?;
    Ok(render(&session, Some(&user), "profile", page).await)
}

/// Applies profile edits after re-verifying the password
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(unauthorized(&session).await);
    };

    let edit = match ProfileForm::from_pairs(pairs).validate() {
        Ok(edit) => edit,
        Err(errors) => {
            let page = profile_page(&state, &user, errors).await?;
            return Ok(render(&session, Some(&user), "profile", page).await);
        }
    };

    match accounts::update_profile(state.store.as_ref(), &user, edit).await {
        Ok(Some(_)) => Ok(redirect_with_flash(&session, FlashLevel::Info, "Changes updated", "/").await),
        Ok(None) => Ok(redirect_with_flash(&session, FlashLevel::Danger, "Invalid Credentials", "/").await),
        Err(AppError::Conflict(message)) => {
            Ok(redirect_with_flash(&session, FlashLevel::Danger, message, "/users/profile").await)
        }
        Err(e) => Err(e),
    }
}

/// Deletes the current user and ends their session
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(unauthorized(&session).await);
    };

    session.log_out().await;
    accounts::delete_account(state.store.as_ref(), user.id).await?;

    Ok(Redirect::to("/signup").into_response())
}
