//! Image search providers used as the image-generation fallback.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use super::{ImageSearch, ProviderError};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Credentials for the Google Custom Search JSON API.
#[derive(Clone)]
pub struct GoogleSearchSettings {
    pub endpoint: String,
    pub api_key: String,
    /// Programmable search engine id (`cx`).
    pub engine_id: String,
}

impl std::fmt::Debug for GoogleSearchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSearchSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

/// Google Custom Search in image mode; returns the first hit's link.
#[derive(Debug, Clone)]
pub struct GoogleImageSearch {
    http: Client,
    settings: GoogleSearchSettings,
}

impl GoogleImageSearch {
    pub fn new(http: Client, settings: GoogleSearchSettings) -> Self {
        Self { http, settings }
    }

    fn request_url(&self, query: &str) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            &self.settings.endpoint,
            &[
                ("key", self.settings.api_key.as_str()),
                ("cx", self.settings.engine_id.as_str()),
                ("q", query),
                ("searchType", "image"),
                ("num", "1"),
            ],
        )
        .map_err(|e| ProviderError::Config(format!("search endpoint: {e}")))
    }
}

#[async_trait]
impl ImageSearch for GoogleImageSearch {
    async fn search(&self, query: &str) -> Result<Option<String>, ProviderError> {
        let url = self.request_url(query)?;
        debug!(query_len = query.len(), "image search request");

        // The request URL carries the API key; keep it out of error messages.
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Http(e.without_url()))?;
        Ok(first_link(&body))
    }
}

/// Stand-in used when no search credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledImageSearch;

#[async_trait]
impl ImageSearch for DisabledImageSearch {
    async fn search(&self, _query: &str) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }
}

fn first_link(body: &Value) -> Option<String> {
    body.pointer("/items/0/link")
        .and_then(Value::as_str)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn client() -> GoogleImageSearch {
        GoogleImageSearch::new(
            Client::new(),
            GoogleSearchSettings {
                endpoint: DEFAULT_SEARCH_ENDPOINT.into(),
                api_key: "key-123".into(),
                engine_id: "cx-456".into(),
            },
        )
    }

    #[test]
    fn request_url_encodes_query() {
        let url = client().request_url("cats & dogs").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".into(), "cats & dogs".into())));
        assert!(pairs.contains(&("searchType".into(), "image".into())));
        assert!(pairs.contains(&("cx".into(), "cx-456".into())));
    }

    #[test]
    fn first_link_reads_first_item() {
        let body = json!({ "items": [{ "link": "https://a/1.jpg" }, { "link": "https://a/2.jpg" }] });
        assert_eq!(first_link(&body).as_deref(), Some("https://a/1.jpg"));
        assert_eq!(first_link(&json!({ "searchInformation": {} })), None);
    }

    #[test]
    fn debug_hides_api_key() {
        assert!(!format!("{:?}", client()).contains("key-123"));
    }

    #[tokio::test]
    async fn transport_errors_do_not_expose_api_key() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let search = GoogleImageSearch::new(
            Client::builder().no_proxy().build().unwrap(),
            GoogleSearchSettings {
                endpoint: format!("http://{addr}/customsearch/v1"),
                api_key: "SECRET-KEY-123".into(),
                engine_id: "cx".into(),
            },
        );
        let err = search.search("draw a cat").await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn disabled_search_finds_nothing() {
        assert_eq!(DisabledImageSearch.search("anything").await.unwrap(), None);
    }
}
