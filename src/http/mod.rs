//! HTTP inbound adapter.
//!
//! - `GET /` service descriptor
//! - `GET /health` liveness check
//! - `POST /download` clip, upload and return the hosted URL

use crate::application::clip_service::ClipService;
use crate::domain::error::ClipError;
use crate::domain::media::{ClipRequest, ClipResponse, ErrorBody};
use crate::ports::downloader::VideoDownloader;
use crate::ports::uploader::MediaUploader;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const SERVICE_NAME: &str = "ClipEngine Video Downloader";

pub fn router<D, U>(service: Arc<ClipService<D, U>>) -> Router
where
    D: VideoDownloader + 'static,
    U: MediaUploader + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/download", post(download::<D, U>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

impl IntoResponse for ClipError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_client_error() {
            tracing::warn!(error = %self, kind = self.kind(), "Request rejected");
        } else {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "endpoints": {
            "/download": "POST - Download a video clip and upload it to the media host",
            "/health": "GET - Health check"
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn download<D, U>(
    State(service): State<Arc<ClipService<D, U>>>,
    payload: Result<Json<ClipRequest>, JsonRejection>,
) -> Result<Json<ClipResponse>, ClipError>
where
    D: VideoDownloader + 'static,
    U: MediaUploader + 'static,
{
    let Json(request) = payload.map_err(|rejection| ClipError::Validation(rejection.body_text()))?;
    service.handle(request).await.map(Json)
}
