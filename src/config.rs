//! Configuration read once from the environment at process start.

use crate::domain::clip::ClipMode;
use crate::domain::timecode::TimestampMode;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} env var required")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Credentials for the Cloudinary upload API.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Base URL of the upload API, overridable for tests
    pub api_base: String,
    /// Folder every upload is placed in
    pub folder: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("folder", &self.folder)
            .finish()
    }
}

/// Options passed through to yt-dlp.
#[derive(Clone, Debug)]
pub struct DownloaderConfig {
    /// Path or name of the yt-dlp binary
    pub binary: String,
    /// yt-dlp format selector
    pub format: String,
    pub socket_timeout_secs: u32,
    pub retries: u32,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: u16,
    /// Directory for scratch media files
    pub tmp_dir: PathBuf,
    pub clip_mode: ClipMode,
    pub timestamp_mode: TimestampMode,
    pub cloudinary: CloudinaryConfig,
    pub downloader: DownloaderConfig,
}

impl AppConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let cloudinary = CloudinaryConfig {
            cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
            api_key: required("CLOUDINARY_API_KEY")?,
            api_secret: required("CLOUDINARY_API_SECRET")?,
            api_base: or_default("CLOUDINARY_API_BASE", "https://api.cloudinary.com")
                .trim_end_matches('/')
                .to_string(),
            folder: or_default("UPLOAD_FOLDER", "clipengine"),
        };

        let downloader = DownloaderConfig {
            binary: or_default("YTDLP_BIN", "yt-dlp"),
            format: or_default("DOWNLOAD_FORMAT", "worst[ext=mp4]/worst"),
            socket_timeout_secs: parse_value(
                "SOCKET_TIMEOUT_SECS",
                &or_default("SOCKET_TIMEOUT_SECS", "30"),
            )?,
            retries: parse_value("DOWNLOAD_RETRIES", &or_default("DOWNLOAD_RETRIES", "3"))?,
        };

        let tmp_dir = lookup("TMP_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Self {
            addr: or_default("ADDR", "0.0.0.0"),
            port: parse_value("PORT", &or_default("PORT", "5000"))?,
            tmp_dir,
            clip_mode: parse_value("CLIP_MODE", &or_default("CLIP_MODE", "clip"))?,
            timestamp_mode: parse_value(
                "TIMESTAMP_MODE",
                &or_default("TIMESTAMP_MODE", "lenient"),
            )?,
            cloudinary,
            downloader,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
