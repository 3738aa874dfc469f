//! `POST /chat`: answer one message and log the exchange.
//!
//! The response is always HTTP 200 with a `reply` field.  Refusals, upstream
//! failures and empty image searches are all expressed in the reply text.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{debug, warn};
use utoipa::OpenApi;

use crate::entities::{HistoryStore, NewChatRecord};
use crate::schemas::chat::{ChatRequest, ChatResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(chat), components(schemas(ChatRequest, ChatResponse)))]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Chat with the bot (`POST /chat`).
///
/// Denylisted messages get a fixed refusal and are not stored.  Every other
/// exchange is appended to the history, whatever the upstream outcome.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply text (errors included)", body = ChatResponse),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    debug!(message_len = req.message.len(), "chat request");

    let reply = state.resolver.resolve(&req.message).await;
    let text = reply.render();

    if reply.is_persisted() {
        match state
            .store
            .record(NewChatRecord::anonymous(req.message, text.clone()))
            .await
        {
            Ok(id) => debug!(id, "exchange recorded"),
            Err(e) => warn!(error = %e, "failed to persist chat exchange"),
        }
    }

    Json(ChatResponse { reply: text })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
