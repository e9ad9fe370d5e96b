//! Cloudinary signed-upload [`MediaUploader`].

use crate::config::CloudinaryConfig;
use crate::domain::media::UploadResult;
use crate::ports::uploader::MediaUploader;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploaderError {
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    #[serde(default)]
    duration: Option<f64>,
}

/// `k=v` pairs sorted by key and joined with `&`, as Cloudinary expects before hashing.
pub fn string_to_sign(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hex SHA-256 request signature.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryUploader {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: CloudinaryConfig) -> Self {
        Self { client, config }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/video/upload",
            self.config.api_base, self.config.cloud_name
        )
    }

    async fn upload_at(
        &self,
        local_path: &Path,
        public_id: &str,
        timestamp: u64,
    ) -> Result<UploadResult, UploaderError> {
        let body = tokio::fs::read(local_path)
            .await
            .map_err(|source| UploaderError::ReadFile {
                path: local_path.display().to_string(),
                source,
            })?;
        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.mp4", public_id));

        let timestamp = timestamp.to_string();
        let signature = sign_params(
            &[
                ("folder", self.config.folder.as_str()),
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let form = Form::new()
            .part("file", Part::bytes(body).file_name(file_name))
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("public_id", public_id.to_string())
            .text("folder", self.config.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        tracing::info!(public_id, folder = %self.config.folder, "Uploading to Cloudinary");
        let resp = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(UploaderError::Rejected {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: UploadResponse = resp.json().await?;
        Ok(UploadResult {
            hosted_url: parsed.secure_url,
            duration: parsed.duration,
        })
    }
}

/// Extracts `error.message` from a Cloudinary error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(
        &self,
        local_path: &Path,
        public_id: &str,
    ) -> Result<UploadResult, Box<dyn Error + Send + Sync>> {
        Ok(self.upload_at(local_path, public_id, unix_timestamp()).await?)
    }
}
