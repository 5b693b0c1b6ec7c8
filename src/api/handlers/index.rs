use super::{current_user, take_flashes};
use crate::api::pages;
use axum::{
    extract::Extension,
    response::{Html, IntoResponse},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Overview page", content_type = "text/html"),
    ),
    tag = "pages"
)]
// axum handler for the overview page
pub async fn index(session: Session, pool: Extension<SqlitePool>) -> impl IntoResponse {
    let user = match current_user(&session, &pool).await {
        Ok(user) => user,
        Err(status) => return status.into_response(),
    };

    let flashes = take_flashes(&session).await;

    Html(pages::index_page(user.as_ref(), &flashes)).into_response()
}
