pub mod create_profile;
pub mod health;
pub mod index;
pub mod login;
pub mod logout;
pub mod profile;
pub mod storage;

// common functions for the handlers
use axum::http::StatusCode;
use self::storage::User;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::error;

/// Session key holding the verified identity URL.
pub const OPENID_KEY: &str = "openid";
/// Session key holding the provider-reported authentication time, if any.
pub const AUTH_TIME_KEY: &str = "auth_time";
/// Queued flash messages, drained on the next rendered page.
pub(crate) const FLASHES_KEY: &str = "_flashes";
// Transient login flow state.
pub(crate) const STATE_KEY: &str = "state";
pub(crate) const NONCE_KEY: &str = "nonce";
pub(crate) const NEXT_KEY: &str = "next";

/// Deliberately shallow check, the profile forms only require an `@`.
pub fn valid_email(email: &str) -> bool {
    email.contains('@')
}

/// Clamp the post-login redirect to a local path to avoid open redirects.
pub(crate) fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next.to_string(),
        _ => "/".to_string(),
    }
}

/// Queue a flash message for the next rendered page.
pub(crate) async fn flash(session: &Session, message: &str) {
    let mut flashes = match session.get::<Vec<String>>(FLASHES_KEY).await {
        Ok(Some(flashes)) => flashes,
        Ok(None) => Vec::new(),
        Err(err) => {
            error!("Failed to read flash messages: {err}");
            Vec::new()
        }
    };

    flashes.push(message.to_string());

    if let Err(err) = session.insert(FLASHES_KEY, flashes).await {
        error!("Failed to queue flash message: {err}");
    }
}

/// Drain the queued flash messages.
pub(crate) async fn take_flashes(session: &Session) -> Vec<String> {
    match session.remove::<Vec<String>>(FLASHES_KEY).await {
        Ok(Some(flashes)) => flashes,
        Ok(None) => Vec::new(),
        Err(err) => {
            error!("Failed to drain flash messages: {err}");
            Vec::new()
        }
    }
}

/// Identity URL stored in the session, if the user went through the login
/// handshake.
pub(crate) async fn session_identity(session: &Session) -> Result<Option<String>, StatusCode> {
    match session.get::<String>(OPENID_KEY).await {
        Ok(identity) => Ok(identity),
        Err(err) => {
            error!("Failed to read session: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Resolve the session's identity URL to a `users` row.
///
/// The request-scoped equivalent of a `before_request` hook: handlers call
/// this first and branch on the result.
pub(crate) async fn current_user(
    session: &Session,
    pool: &SqlitePool,
) -> Result<Option<User>, StatusCode> {
    let Some(identity) = session_identity(session).await? else {
        return Ok(None);
    };

    match storage::find_by_openid(pool, &identity).await {
        Ok(user) => Ok(user),
        Err(err) => {
            error!("Failed to resolve session user: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
