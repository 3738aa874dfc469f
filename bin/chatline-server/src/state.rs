//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use chatline_core::ReplyResolver;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::fetcher::ImageFetcher;

/// State shared across all HTTP handlers.
///
/// Built once in `main`; nothing in it is mutated after startup.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Append-only chat history.
    pub store: Arc<SqliteStore>,
    /// Moderation, classification and provider dispatch.
    pub resolver: ReplyResolver,
    /// Remote image downloads for `/download`.
    pub fetcher: ImageFetcher,
}
