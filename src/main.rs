//! ClipEngine binary.
//!
//! Wires up:
//! - yt-dlp downloader and Cloudinary uploader adapters
//! - the clip pipeline service
//! - the HTTP layer

use clipengine::adapters::{CloudinaryUploader, YtDlpDownloader};
use clipengine::{http, AppConfig, ClipService, ClipSettings};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // loads .env first so RUST_LOG from it reaches the filter
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("clipengine=info,tower_http=info")),
        )
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    // 1. Adapters
    let downloader = YtDlpDownloader::new(config.downloader.clone());
    let uploader = CloudinaryUploader::new(config.cloudinary.clone());

    // 2. Application service
    let service = Arc::new(ClipService::new(
        downloader,
        uploader,
        ClipSettings::from_config(&config),
    ));

    // 3. HTTP layer
    let app = http::router(service);

    let address = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%address, error = %e, "Failed to bind TCP listener");
            std::process::exit(1);
        }
    };
    tracing::info!(
        %address,
        clip_mode = ?config.clip_mode,
        timestamp_mode = ?config.timestamp_mode,
        tmp_dir = %config.tmp_dir.display(),
        "Listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
