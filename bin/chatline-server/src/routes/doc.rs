use crate::routes::{chat, download, health, history};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "chatline-server",
    description = "Minimal chatbot API: text replies, image generation with search fallback, history and image download",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(chat::ChatApi::openapi());
    root.merge(history::HistoryApi::openapi());
    root.merge(download::DownloadApi::openapi());
    root.merge(health::HealthApi::openapi());
    root
}
