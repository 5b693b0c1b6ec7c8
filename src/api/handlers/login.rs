//! The OpenID login handshake.
//!
//! `POST /login` starts the flow: the flow state (`state`, `nonce`, `next`)
//! is stashed in the session and the user agent is redirected to the
//! provider. The provider redirects back to `GET /login` with an assertion,
//! which the external engine verifies. Known identities are signed in,
//! first-time identities are sent to `/create-profile`.

use super::{
    current_user, flash, safe_next, storage, take_flashes, AUTH_TIME_KEY, NEXT_KEY, NONCE_KEY,
    OPENID_KEY, STATE_KEY,
};
use crate::api::pages;
use crate::openid::IdentityProvider;
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{debug, error};
use url::form_urlencoded;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub next: Option<String>,
    /// Error code the provider reports instead of an assertion.
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginForm {
    pub openid: Option<String>,
    pub next: Option<String>,
}

#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form", content_type = "text/html"),
        (status = 303, description = "Already signed in, or a verified provider assertion")
    ),
    tag = "auth"
)]
// axum handler for the login form and the provider callback
pub async fn login(
    session: Session,
    pool: Extension<SqlitePool>,
    provider: Extension<Arc<dyn IdentityProvider>>,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    // if we are already signed in, go back to where we came from
    let user = match current_user(&session, &pool).await {
        Ok(user) => user,
        Err(status) => return status.into_response(),
    };

    if user.is_some() {
        return Redirect::to(&safe_next(query.next.as_deref())).into_response();
    }

    if let (Some(code), Some(state)) = (query.code.as_deref(), query.state.as_deref()) {
        return callback(&session, &pool, &*provider.0, code, state).await;
    }

    // A state-bearing response without a code means the provider ended the
    // flow without an assertion (e.g. the user denied access). Surface the
    // error on the form instead of leaving a stale flow in the session.
    if query.state.is_some() {
        clear_flow_state(&session).await;

        let message = match query.error.as_deref() {
            Some(error) => format!("Error: sign in failed ({error})"),
            None => "Error: sign in failed".to_string(),
        };
        flash(&session, &message).await;
    }

    let flashes = take_flashes(&session).await;

    Html(pages::login_page(&flashes, &safe_next(query.next.as_deref()))).into_response()
}

#[utoipa::path(
    post,
    path = "/login",
    responses(
        (status = 200, description = "Login form re-rendered, no identifier given", content_type = "text/html"),
        (status = 303, description = "Redirect to the identity provider")
    ),
    tag = "auth"
)]
// axum handler starting the login flow
pub async fn submit(
    session: Session,
    pool: Extension<SqlitePool>,
    provider: Extension<Arc<dyn IdentityProvider>>,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    let user = match current_user(&session, &pool).await {
        Ok(user) => user,
        Err(status) => return status.into_response(),
    };

    let next = safe_next(form.next.as_deref());

    if user.is_some() {
        return Redirect::to(&next).into_response();
    }

    let Some(identifier) = form
        .openid
        .as_deref()
        .map(str::trim)
        .filter(|identifier| !identifier.is_empty())
    else {
        let flashes = take_flashes(&session).await;
        return Html(pages::login_page(&flashes, &next)).into_response();
    };

    debug!("Starting OpenID login for identifier: {identifier}");

    let state = flow_token();
    let nonce = flow_token();

    // Stash the flow state, the callback checks it against the response.
    for (key, value) in [(STATE_KEY, &state), (NONCE_KEY, &nonce), (NEXT_KEY, &next)] {
        if let Err(err) = session.insert(key, value).await {
            error!("Failed to persist login flow state: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    Redirect::to(provider.auth_url(&state, &nonce).as_str()).into_response()
}

/// Called with the assertion the provider redirected back with. Verification
/// is entirely the external engine's job, this only checks the session's
/// flow state and decides between sign-in and first-time profile creation.
async fn callback(
    session: &Session,
    pool: &SqlitePool,
    provider: &dyn IdentityProvider,
    code: &str,
    state: &str,
) -> Response {
    let expected = match session.remove::<String>(STATE_KEY).await {
        Ok(expected) => expected,
        Err(err) => {
            error!("Failed to read login flow state: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let nonce = match session.remove::<String>(NONCE_KEY).await {
        Ok(nonce) => nonce,
        Err(err) => {
            error!("Failed to read login flow state: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let next = match session.remove::<String>(NEXT_KEY).await {
        Ok(next) => safe_next(next.as_deref()),
        Err(err) => {
            error!("Failed to read login flow state: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // A missing or mismatched state means the response does not belong to a
    // flow this session started.
    let Some(nonce) = nonce.filter(|_| expected.as_deref() == Some(state)) else {
        flash(session, "Error: unexpected login response").await;

        return Redirect::to("/login").into_response();
    };

    let outcome = match provider.verify(code, &nonce).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("OpenID verification failed: {err}");
            flash(session, "Error: sign in failed").await;

            return Redirect::to("/login").into_response();
        }
    };

    if let Err(err) = session.insert(OPENID_KEY, &outcome.identity_url).await {
        error!("Failed to store session identity: {err}");

        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    if let Some(auth_time) = outcome.auth_time {
        // Optional policy information, losing it does not fail the login.
        if let Err(err) = session.insert(AUTH_TIME_KEY, auth_time).await {
            error!("Failed to store auth_time: {err}");
        }
    }

    match storage::find_by_openid(pool, &outcome.identity_url).await {
        Ok(Some(_)) => {
            flash(session, "Successfully signed in").await;

            Redirect::to(&next).into_response()
        }
        Ok(None) => {
            // First login: collect a profile before proceeding.
            let mut query = form_urlencoded::Serializer::new(String::new());
            query.append_pair("next", &next);
            if let Some(name) = &outcome.name {
                query.append_pair("name", name);
            }
            if let Some(email) = &outcome.email {
                query.append_pair("email", email);
            }

            Redirect::to(&format!("/create-profile?{}", query.finish())).into_response()
        }
        Err(err) => {
            error!("Failed to look up user: {err}");

            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Drop the transient flow keys from the session.
async fn clear_flow_state(session: &Session) {
    for key in [STATE_KEY, NONCE_KEY, NEXT_KEY] {
        if let Err(err) = session.remove::<String>(key).await {
            error!("Failed to clear login flow state: {err}");
        }
    }
}

fn flow_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_token() {
        let token = flow_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, flow_token());
    }
}
