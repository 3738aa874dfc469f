//! Reply resolution: decide how to answer a message and shape the reply text.
//!
//! Flow per message:
//!
//! 1. Denylist moderation; a rejection ends the request with [`Reply::Refused`].
//! 2. Image intent → image generation, falling back to exactly one image
//!    search with the same query when generation fails.
//! 3. Anything else → text completion with the optional system prompt.
//!
//! Provider failures never escape as errors; they are folded into the
//! returned [`Reply`] so the HTTP layer can always answer 200.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classifier::is_image_request;
use crate::moderation::{is_safe, REFUSAL_REPLY};
use crate::provider::{ImageGenerator, ImageSearch, TextGenerator};

/// Image resolution requested from the generator.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Route that serves downloads of remote images.
pub const DOWNLOAD_ROUTE: &str = "/download";

const IMAGE_NOT_FOUND_REPLY: &str =
    "Sorry, I couldn't generate or find an image for that request.";

/// Immutable resolver settings, built once at startup.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Instruction sent ahead of every text prompt; `None` sends the user
    /// message alone.
    pub system_prompt: Option<String>,
    pub image_size: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_owned()),
            image_size: DEFAULT_IMAGE_SIZE.to_owned(),
        }
    }
}

/// Where an image URL in a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Generated,
    Searched,
}

/// Outcome of resolving one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The moderator rejected the message; nothing else happened.
    Refused,
    /// First completion text, verbatim.
    Text(String),
    /// An image URL, either generated or found by the search fallback.
    Image { url: String, source: ImageSource },
    /// Generation failed and the search fallback found nothing.
    ImageNotFound,
    /// The text provider failed; carries the provider's error message.
    ProviderError(String),
}

impl Reply {
    /// Render the user-facing reply string.
    pub fn render(&self) -> String {
        match self {
            Reply::Refused => REFUSAL_REPLY.to_owned(),
            Reply::Text(text) => text.clone(),
            Reply::Image { url, source } => {
                let lead = match source {
                    ImageSource::Generated => "Here is the image you requested",
                    ImageSource::Searched => {
                        "I couldn't generate that image, but here is one I found"
                    }
                };
                format!("{lead}: {url}\nDownload it here: {}", download_link(url))
            }
            Reply::ImageNotFound => IMAGE_NOT_FOUND_REPLY.to_owned(),
            Reply::ProviderError(message) => format!("🚫 Provider error: {message}"),
        }
    }

    /// Whether the exchange belongs in the history store.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, Reply::Refused)
    }
}

/// Relative download link for an image URL, e.g. `/download?url=https%3A%2F%2F…`.
pub fn download_link(url: &str) -> String {
    format!("{DOWNLOAD_ROUTE}?url={}", urlencoding::encode(url))
}

/// Answers messages using the configured providers.
#[derive(Clone)]
pub struct ReplyResolver {
    config: ResolverConfig,
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    search: Arc<dyn ImageSearch>,
}

impl std::fmt::Debug for ReplyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReplyResolver {
    pub fn new(
        config: ResolverConfig,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        search: Arc<dyn ImageSearch>,
    ) -> Self {
        Self { config, text, images, search }
    }

    pub async fn resolve(&self, message: &str) -> Reply {
        if !is_safe(message) {
            info!("message rejected by denylist");
            return Reply::Refused;
        }

        if is_image_request(message) {
            debug!("message classified as image request");
            return self.resolve_image(message).await;
        }

        match self
            .text
            .complete(self.config.system_prompt.as_deref(), message)
            .await
        {
            Ok(text) => Reply::Text(text),
            Err(e) => {
                warn!(error = %e, "text generation failed");
                Reply::ProviderError(e.to_string())
            }
        }
    }

    async fn resolve_image(&self, query: &str) -> Reply {
        let generation_error = match self.images.generate(query, &self.config.image_size, 1).await {
            Ok(url) => {
                return Reply::Image { url, source: ImageSource::Generated };
            }
            Err(e) => e,
        };

        warn!(error = %generation_error, "image generation failed; falling back to search");
        match self.search.search(query).await {
            Ok(Some(url)) => Reply::Image { url, source: ImageSource::Searched },
            Ok(None) => {
                info!("image search returned no results");
                Reply::ImageNotFound
            }
            Err(e) => {
                warn!(error = %e, "image search failed");
                Reply::ImageNotFound
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
