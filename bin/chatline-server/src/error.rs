//! Unified server error type.
//!
//! Handlers that can fail return `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a JSON-body response
//! with a matching status code.  `/chat` never uses it: provider failures
//! there are folded into the reply text.
//!
//! Internal errors (database, I/O) are logged with full detail but only a
//! generic message is returned so paths and SQL never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::fetcher::FetchError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure while downloading a remote image.
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::Fetch(FetchError::InvalidUrl(m)) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Fetch(e @ (FetchError::Http(_) | FetchError::Status(_))) => {
                warn!(error = %e, "image download failed upstream");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            ServerError::Fetch(e @ FetchError::Io(_)) => {
                error!(error = %e, "failed to buffer downloaded image");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
