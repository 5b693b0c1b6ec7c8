use super::{flash, safe_next, AUTH_TIME_KEY, OPENID_KEY};
use axum::{
    extract::Query,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct LogoutQuery {
    pub next: Option<String>,
}

#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 303, description = "Session identity cleared, redirect to the next URL")
    ),
    tag = "auth"
)]
// axum handler for logout
pub async fn logout(session: Session, Query(query): Query<LogoutQuery>) -> impl IntoResponse {
    if let Err(err) = session.remove::<String>(OPENID_KEY).await {
        error!("Failed to clear session identity: {err}");
    }
    if let Err(err) = session.remove::<i64>(AUTH_TIME_KEY).await {
        error!("Failed to clear session auth_time: {err}");
    }

    flash(&session, "You have been signed out").await;

    Redirect::to(&safe_next(query.next.as_deref()))
}
