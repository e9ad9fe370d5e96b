use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_START: &str = "00:00";
pub const DEFAULT_END: &str = "01:00";

/// Body of `POST /download`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClipRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl ClipRequest {
    pub fn start_or_default(&self) -> &str {
        self.start.as_deref().unwrap_or(DEFAULT_START)
    }

    pub fn end_or_default(&self) -> &str {
        self.end.as_deref().unwrap_or(DEFAULT_END)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub local_path: PathBuf,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub hosted_url: String,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipResponse {
    pub status: &'static str,
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub duration: Option<f64>,
    pub clip_range: String,
    pub format: &'static str,
}

impl ClipResponse {
    pub fn success(
        video_id: String,
        title: String,
        upload: UploadResult,
        start: &str,
        end: &str,
    ) -> Self {
        Self {
            status: "success",
            video_id,
            title,
            url: upload.hosted_url,
            duration: upload.duration,
            clip_range: format!("{} - {}", start, end),
            format: "mp4",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
