//! Upstream provider seams.
//!
//! The resolver only ever talks to the three traits defined here, so the
//! hosted services can be swapped (or mocked in tests) without touching the
//! branching logic.  Concrete clients:
//!
//! - [`openai::OpenAiClient`] implements [`TextGenerator`] and [`ImageGenerator`].
//! - [`search::GoogleImageSearch`] implements [`ImageSearch`].
//! - [`search::DisabledImageSearch`] is used when no search credentials exist.

pub mod openai;
pub mod search;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

pub use openai::{OpenAiClient, OpenAiSettings};
pub use search::{DisabledImageSearch, GoogleImageSearch, GoogleSearchSettings};

/// Errors returned by any upstream provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset, …).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider answered 2xx but the body did not have the expected shape.
    #[error("invalid provider response: {message}")]
    InvalidResponse { message: String },

    /// The client was configured with values that cannot form a request.
    #[error("invalid provider configuration: {0}")]
    Config(String),
}

impl ProviderError {
    pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
        ProviderError::InvalidResponse { message: message.into() }
    }
}

/// Chat-style text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return the text of the first completion for `message`, optionally
    /// preceded by a system instruction.
    async fn complete(
        &self,
        system_prompt: Option<&str>,
        message: &str,
    ) -> Result<String, ProviderError>;
}

/// Prompt-to-image generation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate `n` images of `size` and return the URL of the first one.
    async fn generate(&self, prompt: &str, size: &str, n: u32) -> Result<String, ProviderError>;
}

/// Query-to-image lookup.
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Return the URL of the first result, or `None` when nothing matched.
    async fn search(&self, query: &str) -> Result<Option<String>, ProviderError>;
}

/// Build the HTTP client shared by every provider.
///
/// `timeout` bounds the whole request, body included.
pub fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Ok(Client::builder()
        .user_agent(concat!("chatline/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}
