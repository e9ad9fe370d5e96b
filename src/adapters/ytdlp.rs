//! yt-dlp backed [`VideoDownloader`].

use crate::config::DownloaderConfig;
use crate::domain::clip::ClipWindow;
use crate::domain::media::DownloadResult;
use crate::ports::downloader::VideoDownloader;
use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::io;
use std::path::Path;
use std::process::Output;
use thiserror::Error;
use tokio::process::Command as TokioCommand;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const DEFAULT_TITLE: &str = "video";

#[derive(Debug, Error)]
pub enum DownloaderError {
    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("yt-dlp exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

// Process execution seam, so argument handling is testable without yt-dlp installed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<Output>;
}

pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<Output> {
        TokioCommand::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
    }
}

pub struct YtDlpDownloader<R = TokioCommandRunner> {
    config: DownloaderConfig,
    runner: R,
}

impl YtDlpDownloader<TokioCommandRunner> {
    pub fn new(config: DownloaderConfig) -> Self {
        Self::with_runner(config, TokioCommandRunner)
    }
}

impl<R: CommandRunner> YtDlpDownloader<R> {
    pub fn with_runner(config: DownloaderConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Full yt-dlp argument list for one download.
    pub fn build_args(&self, url: &str, window: ClipWindow, output_path: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--no-playlist".into(),
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-part".into(),
            "--format".into(),
            self.config.format.clone(),
            "--add-header".into(),
            format!("User-Agent:{}", USER_AGENT),
            "--add-header".into(),
            format!("Accept-Language:{}", ACCEPT_LANGUAGE),
            "--socket-timeout".into(),
            self.config.socket_timeout_secs.to_string(),
            "--retries".into(),
            self.config.retries.to_string(),
        ];

        if let (ClipWindow::Section { start_seconds, .. }, Some(end)) =
            (window, window.end_seconds())
        {
            args.push("--download-sections".into());
            args.push(format!("*{}-{}", start_seconds, end));
            args.push("--force-keyframes-at-cuts".into());
        }

        args.extend([
            "--no-simulate".into(),
            "--dump-single-json".into(),
            "--output".into(),
            output_path.to_string_lossy().into_owned(),
            "--".into(),
            url.to_string(),
        ]);
        args
    }
}

/// Reads the title from yt-dlp's `--dump-single-json` output.
fn title_from_stdout(stdout: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stdout);
    let line = text.lines().rev().find(|line| !line.trim().is_empty())?;
    let info: Value = serde_json::from_str(line).ok()?;
    info.get("title")
        .and_then(|title| title.as_str())
        .map(String::from)
}

#[async_trait]
impl<R: CommandRunner> VideoDownloader for YtDlpDownloader<R> {
    async fn download(
        &self,
        url: &str,
        window: ClipWindow,
        output_path: &Path,
    ) -> Result<DownloadResult, Box<dyn Error + Send + Sync>> {
        let args = self.build_args(url, window, output_path);
        tracing::debug!(binary = %self.config.binary, ?args, "Running yt-dlp");

        let output = self
            .runner
            .run(&self.config.binary, &args)
            .await
            .map_err(|source| DownloaderError::Spawn {
                binary: self.config.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(status = %output.status, %stderr, "yt-dlp failed");
            return Err(DownloaderError::Failed {
                status: output.status.to_string(),
                stderr,
            }
            .into());
        }

        let title = title_from_stdout(&output.stdout).unwrap_or_else(|| {
            tracing::debug!("yt-dlp printed no title, using default");
            DEFAULT_TITLE.to_string()
        });

        Ok(DownloadResult {
            local_path: output_path.to_path_buf(),
            title,
        })
    }
}
