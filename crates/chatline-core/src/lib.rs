//! chatline-core – transport-free chatbot logic.
//!
//! Everything the HTTP server needs to answer a message lives here:
//! keyword classification, denylist moderation, the provider clients and the
//! [`resolver::ReplyResolver`] that ties them together.  Nothing in this crate
//! knows about axum or the database.

pub mod classifier;
pub mod moderation;
pub mod provider;
pub mod resolver;

pub use classifier::is_image_request;
pub use moderation::is_safe;
pub use provider::{ImageGenerator, ImageSearch, ProviderError, TextGenerator};
pub use resolver::{ImageSource, Reply, ReplyResolver, ResolverConfig};
