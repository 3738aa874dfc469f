//! Shared fixtures for handler and store tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chatline_core::{ImageGenerator, ImageSearch, ProviderError, ReplyResolver, TextGenerator};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::fetcher::ImageFetcher;
use crate::routes;
use crate::state::AppState;

/// Fresh SQLite file in its own temp directory; keep the dir alive.
pub async fn temp_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("chat.db").display());
    let store = SqliteStore::connect(&url).await.expect("open store");
    (dir, store)
}

#[derive(Default)]
pub(crate) struct Calls {
    text: AtomicUsize,
    images: AtomicUsize,
    searches: Mutex<Vec<String>>,
}

/// Canned providers that count their calls.
#[derive(Clone, Default)]
pub struct StubProviders {
    pub text_fails: bool,
    pub images_fail: bool,
    pub(crate) calls: Arc<Calls>,
}

impl StubProviders {
    pub fn text_calls(&self) -> usize {
        self.calls.text.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.calls.images.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_queries().len()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.calls.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubProviders {
    async fn complete(&self, _system: Option<&str>, message: &str) -> Result<String, ProviderError> {
        self.calls.text.fetch_add(1, Ordering::SeqCst);
        if self.text_fails {
            return Err(ProviderError::Api { status: 429, message: "rate limit reached".into() });
        }
        Ok(format!("stub reply to: {message}"))
    }
}

#[async_trait]
impl ImageGenerator for StubProviders {
    async fn generate(&self, _prompt: &str, _size: &str, _n: u32) -> Result<String, ProviderError> {
        self.calls.images.fetch_add(1, Ordering::SeqCst);
        if self.images_fail {
            return Err(ProviderError::Api { status: 400, message: "rejected".into() });
        }
        Ok("https://img.test/generated.png".into())
    }
}

#[async_trait]
impl ImageSearch for StubProviders {
    async fn search(&self, query: &str) -> Result<Option<String>, ProviderError> {
        self.calls.searches.lock().unwrap().push(query.to_owned());
        Ok(Some("https://img.test/found.jpg".into()))
    }
}

/// Application state wired to stub providers and a temp database.
pub struct TestApp {
    _dir: TempDir,
    pub state: Arc<AppState>,
    pub providers: StubProviders,
}

impl TestApp {
    pub async fn new(providers: StubProviders) -> Self {
        let (dir, store) = temp_store().await;
        let config = Config::from_lookup(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_owned()),
            _ => None,
        })
        .expect("test config");

        let resolver = ReplyResolver::new(
            config.resolver_config(),
            Arc::new(providers.clone()),
            Arc::new(providers.clone()),
            Arc::new(providers.clone()),
        );
        let state = Arc::new(AppState {
            config: Arc::new(config),
            store: Arc::new(store),
            resolver,
            // Local origins only; keep ambient proxy settings out of the way.
            fetcher: ImageFetcher::new(reqwest::Client::builder().no_proxy().build().expect("client")),
        });
        Self { _dir: dir, state, providers }
    }

    pub fn router(&self) -> Router {
        routes::build(self.state.clone())
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(req).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> Response {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();
    app.oneshot(req).await.unwrap()
}

pub async fn read_bytes(resp: Response) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn read_json(resp: Response) -> serde_json::Value {
    serde_json::from_slice(&read_bytes(resp).await).unwrap()
}
