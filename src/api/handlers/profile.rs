//! Profile edit form, including the delete action.

use super::{
    current_user, flash, storage, take_flashes, valid_email, AUTH_TIME_KEY, OPENID_KEY,
};
use crate::api::pages;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::error;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EditProfileForm {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Present when the delete submit button was used.
    pub delete: Option<String>,
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile edit form", content_type = "text/html"),
        (status = 401, description = "No signed-in user")
    ),
    tag = "auth"
)]
// axum handler for the profile edit form
pub async fn form(session: Session, pool: Extension<SqlitePool>) -> impl IntoResponse {
    let user = match current_user(&session, &pool).await {
        Ok(Some(user)) => user,
        Ok(None) => return StatusCode::UNAUTHORIZED.into_response(),
        Err(status) => return status.into_response(),
    };

    let flashes = take_flashes(&session).await;

    Html(pages::edit_profile_page(
        &flashes, &user, &user.name, &user.email,
    ))
    .into_response()
}

#[utoipa::path(
    post,
    path = "/profile",
    responses(
        (status = 200, description = "Validation failed, form re-rendered", content_type = "text/html"),
        (status = 303, description = "Profile updated or deleted"),
        (status = 401, description = "No signed-in user")
    ),
    tag = "auth"
)]
// axum handler updating or deleting the profile row
pub async fn submit(
    session: Session,
    pool: Extension<SqlitePool>,
    Form(form): Form<EditProfileForm>,
) -> impl IntoResponse {
    let user = match current_user(&session, &pool).await {
        Ok(Some(user)) => user,
        Ok(None) => return StatusCode::UNAUTHORIZED.into_response(),
        Err(status) => return status.into_response(),
    };

    if form.delete.is_some() {
        let deleted = match storage::delete(&pool, user.id).await {
            Ok(deleted) => deleted,
            Err(err) => {
                error!("Failed to delete profile: {err}");

                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        // The identity URL stays valid at the provider, only the local tie
        // between session and profile is severed. A concurrent delete leaves
        // nothing to remove but the session is cleared all the same.
        if let Err(err) = session.remove::<String>(OPENID_KEY).await {
            error!("Failed to clear session identity: {err}");
        }
        if let Err(err) = session.remove::<i64>(AUTH_TIME_KEY).await {
            error!("Failed to clear session auth_time: {err}");
        }

        if deleted {
            flash(&session, "Profile deleted").await;
        }

        return Redirect::to("/").into_response();
    }

    let name = form.name.unwrap_or_default();
    let email = form.email.unwrap_or_default();

    if name.is_empty() {
        flash(&session, "Error: you have to provide a name").await;
    } else if !valid_email(&email) {
        flash(&session, "Error: you have to enter a valid email address").await;
    } else {
        match storage::update(&pool, user.id, &name, &email).await {
            Ok(true) => {
                flash(&session, "Profile successfully updated").await;

                return Redirect::to("/profile").into_response();
            }
            Ok(false) => {
                // The row vanished between the session lookup and the update.
                return StatusCode::UNAUTHORIZED.into_response();
            }
            Err(err) => {
                error!("Failed to update profile: {err}");

                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    let flashes = take_flashes(&session).await;

    Html(pages::edit_profile_page(&flashes, &user, &name, &email)).into_response()
}
