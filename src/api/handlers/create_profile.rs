//! First-login profile creation.
//!
//! The callback in `login` redirects here when the verified identity has no
//! `users` row yet. The page is only reachable mid-handshake: a signed-in
//! user, or a session without a verified identity, is sent back to `/`.

use super::{
    current_user, flash, safe_next, session_identity, storage, take_flashes, valid_email,
};
use crate::api::pages;
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct CreateProfileQuery {
    pub next: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProfileForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub next: Option<String>,
}

/// Identity URL a profile may be created for: the session went through the
/// handshake but no `users` row matched.
async fn pending_identity(
    session: &Session,
    pool: &SqlitePool,
) -> Result<Option<String>, StatusCode> {
    if current_user(session, pool).await?.is_some() {
        return Ok(None);
    }

    session_identity(session).await
}

#[utoipa::path(
    get,
    path = "/create-profile",
    responses(
        (status = 200, description = "Profile creation form", content_type = "text/html"),
        (status = 303, description = "Not in a first-login handshake, back to the overview")
    ),
    tag = "auth"
)]
// axum handler for the profile creation form
pub async fn form(
    session: Session,
    pool: Extension<SqlitePool>,
    Query(query): Query<CreateProfileQuery>,
) -> impl IntoResponse {
    match pending_identity(&session, &pool).await {
        Ok(Some(_)) => {}
        Ok(None) => return Redirect::to("/").into_response(),
        Err(status) => return status.into_response(),
    }

    let flashes = take_flashes(&session).await;

    Html(pages::create_profile_page(
        &flashes,
        &safe_next(query.next.as_deref()),
        query.name.as_deref().unwrap_or_default(),
        query.email.as_deref().unwrap_or_default(),
    ))
    .into_response()
}

#[utoipa::path(
    post,
    path = "/create-profile",
    responses(
        (status = 200, description = "Validation failed, form re-rendered", content_type = "text/html"),
        (status = 303, description = "Profile created, redirect to the next URL")
    ),
    tag = "auth"
)]
// axum handler creating the profile row
pub async fn submit(
    session: Session,
    pool: Extension<SqlitePool>,
    Form(form): Form<CreateProfileForm>,
) -> impl IntoResponse {
    let identity = match pending_identity(&session, &pool).await {
        Ok(Some(identity)) => identity,
        Ok(None) => return Redirect::to("/").into_response(),
        Err(status) => return status.into_response(),
    };

    let name = form.name.unwrap_or_default();
    let email = form.email.unwrap_or_default();
    let next = safe_next(form.next.as_deref());

    if name.is_empty() {
        flash(&session, "Error: you have to provide a name").await;
    } else if !valid_email(&email) {
        flash(&session, "Error: you have to enter a valid email address").await;
    } else {
        // pending_identity checked no row exists for this identity, which is
        // what keeps openid values unique without a database constraint.
        match storage::insert(&pool, &name, &email, &identity).await {
            Ok(_) => {
                flash(&session, "Profile successfully created").await;

                return Redirect::to(&next).into_response();
            }
            Err(err) => {
                error!("Failed to create profile: {err}");

                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    let flashes = take_flashes(&session).await;

    Html(pages::create_profile_page(&flashes, &next, &name, &email)).into_response()
}
