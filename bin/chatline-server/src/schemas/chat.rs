//! Request / response bodies for the chat UI endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::ChatRecord;

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's message. A missing field is treated as an empty message.
    #[serde(default)]
    pub message: String,
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Reply text; upstream failures are described here too.
    pub reply: String,
}

/// One element of the `GET /history` array.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: i64,
    pub user: String,
    pub bot: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatRecord> for HistoryEntry {
    fn from(record: ChatRecord) -> Self {
        Self {
            id: record.id,
            user: record.user_message,
            bot: record.bot_reply,
            created_at: record.created_at,
        }
    }
}

/// Query string for `GET /download`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Absolute http(s) URL of the image to download.
    pub url: String,
}
