//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use chatline_core::provider::openai::DEFAULT_API_BASE;
use chatline_core::provider::search::DEFAULT_SEARCH_ENDPOINT;
use chatline_core::provider::{GoogleSearchSettings, OpenAiSettings};
use chatline_core::resolver::{DEFAULT_IMAGE_SIZE, DEFAULT_SYSTEM_PROMPT};
use chatline_core::ResolverConfig;
use thiserror::Error;

/// Configuration problems that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is missing; set it in the environment or in a .env file")]
    MissingApiKey,
}

/// Runtime configuration for chatline-server.
///
/// Everything except the OpenAI API key has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:5000"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://chat_memory.db"`). The file is
    /// created on first start.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated allowed CORS origins; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    pub openai: OpenAiSettings,

    /// Image-search fallback; `None` disables it.
    pub search: Option<GoogleSearchSettings>,

    /// System instruction sent ahead of text prompts; `None` when set to "".
    pub system_prompt: Option<String>,

    /// Upper bound for every upstream HTTP call, body included.
    pub upstream_timeout: Duration,
}

impl Config {
    /// Build [`Config`] from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env_or = |key: &str, default: &str| non_empty(&lookup, key).unwrap_or_else(|| default.to_owned());

        let api_key = non_empty(&lookup, "OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let search = match (
            non_empty(&lookup, "CHATLINE_SEARCH_API_KEY"),
            non_empty(&lookup, "CHATLINE_SEARCH_ENGINE_ID"),
        ) {
            (Some(api_key), Some(engine_id)) => Some(GoogleSearchSettings {
                endpoint: env_or("CHATLINE_SEARCH_ENDPOINT", DEFAULT_SEARCH_ENDPOINT),
                api_key,
                engine_id,
            }),
            _ => None,
        };

        // An explicitly empty prompt disables the system message.
        let system_prompt = match lookup("CHATLINE_SYSTEM_PROMPT") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => Some(DEFAULT_SYSTEM_PROMPT.to_owned()),
        };

        Ok(Self {
            bind_address: env_or("CHATLINE_BIND", "0.0.0.0:5000"),
            database_url: env_or("CHATLINE_DATABASE_URL", "sqlite://chat_memory.db"),
            log_level: env_or("CHATLINE_LOG", "info"),
            log_json: parse_flag(&lookup, "CHATLINE_LOG_JSON", false),
            cors_allowed_origins: non_empty(&lookup, "CHATLINE_CORS_ORIGINS"),
            enable_swagger: parse_flag(&lookup, "CHATLINE_ENABLE_SWAGGER", true),
            openai: OpenAiSettings {
                api_base: env_or("OPENAI_API_BASE", DEFAULT_API_BASE),
                api_key,
                chat_model: env_or("CHATLINE_CHAT_MODEL", "gpt-4"),
                image_model: env_or("CHATLINE_IMAGE_MODEL", "dall-e-3"),
            },
            search,
            system_prompt,
            upstream_timeout: Duration::from_secs(parse_env(&lookup, "CHATLINE_UPSTREAM_TIMEOUT_SECS", 60)),
        })
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            system_prompt: self.system_prompt.clone(),
            image_size: DEFAULT_IMAGE_SIZE.to_owned(),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    non_empty(lookup, key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    non_empty(lookup, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
