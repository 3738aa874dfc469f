//! `GET /history`: the most recent exchanges, newest first.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::entities::HistoryStore;
use crate::error::ServerError;
use crate::schemas::chat::HistoryEntry;
use crate::state::AppState;

/// Number of exchanges returned by `/history`.
pub const HISTORY_LIMIT: u32 = 10;

#[derive(OpenApi)]
#[openapi(paths(get_history), components(schemas(HistoryEntry)))]
pub struct HistoryApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/history", get(get_history))
}

#[utoipa::path(
    get,
    path = "/history",
    tag = "chat",
    responses(
        (status = 200, description = "Up to 10 most recent exchanges, newest first", body = Vec<HistoryEntry>),
        (status = 500, description = "Database error"),
    )
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HistoryEntry>>, ServerError> {
    let rows = state.store.recent(HISTORY_LIMIT).await?;
    Ok(Json(rows.into_iter().map(HistoryEntry::from).collect()))
}
