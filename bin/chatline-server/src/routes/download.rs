//! `GET /download?url=…`: proxy a remote image back as an attachment.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio_util::io::ReaderStream;
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::chat::DownloadQuery;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(download))]
pub struct DownloadApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/download", get(download))
}

/// Download a remote image (`GET /download?url=…`).
///
/// The upstream body is buffered in a per-request temporary file and then
/// streamed back with `Content-Disposition: attachment`.
#[utoipa::path(
    get,
    path = "/download",
    tag = "images",
    params(DownloadQuery),
    responses(
        (status = 200, description = "Image bytes as an attachment", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Invalid URL"),
        (status = 502, description = "Upstream fetch failed"),
    )
)]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ServerError> {
    debug!(url = %query.url, "download request");
    let image = state.fetcher.fetch(&query.url).await?;

    let headers = [
        (CONTENT_TYPE, image.content_type),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", image.file_name),
        ),
        (CONTENT_LENGTH, image.len.to_string()),
    ];
    let body = Body::from_stream(ReaderStream::new(image.file));
    Ok((headers, body).into_response())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use axum::http::{header, StatusCode};
    use axum::routing::get as get_route;
    use axum::Router;

    use crate::testing::{get, read_bytes, StubProviders, TestApp};

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n-not-really-a-png-but-close-enough-";

    /// Serve a fixed image and a 404 on an ephemeral local port.
    async fn spawn_origin() -> String {
        let origin = Router::new()
            .route(
                "/pics/cat.png",
                get_route(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES) }),
            )
            .route("/pics/gone.png", get_route(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, origin).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn download_uri(url: &str) -> String {
        format!("/download?url={}", urlencode(url))
    }

    fn urlencode(raw: &str) -> String {
        chatline_core::resolver::download_link(raw)
            .trim_start_matches("/download?url=")
            .to_owned()
    }

    #[tokio::test]
    async fn download_returns_source_bytes_as_attachment() {
        let origin = spawn_origin().await;
        let app = TestApp::new(StubProviders::default()).await;

        let resp = get(app.router(), &download_uri(&format!("{origin}/pics/cat.png"))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cat.png\""
        );
        assert_eq!(read_bytes(resp).await, PNG_BYTES);
    }

    #[tokio::test]
    async fn concurrent_downloads_do_not_interfere() {
        let origin = spawn_origin().await;
        let app = TestApp::new(StubProviders::default()).await;
        let uri = download_uri(&format!("{origin}/pics/cat.png"));

        let (a, b) = tokio::join!(get(app.router(), &uri), get(app.router(), &uri));
        assert_eq!(read_bytes(a).await, PNG_BYTES);
        assert_eq!(read_bytes(b).await, PNG_BYTES);
    }

    #[tokio::test]
    async fn upstream_404_is_bad_gateway() {
        let origin = spawn_origin().await;
        let app = TestApp::new(StubProviders::default()).await;

        let resp = get(app.router(), &download_uri(&format!("{origin}/pics/gone.png"))).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_bad_gateway() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let app = TestApp::new(StubProviders::default()).await;

        let resp = get(app.router(), &download_uri(&format!("http://{addr}/x.png"))).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn invalid_url_is_bad_request() {
        let app = TestApp::new(StubProviders::default()).await;

        let resp = get(app.router(), &download_uri("file:///etc/passwd")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = get(app.router(), "/download").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
