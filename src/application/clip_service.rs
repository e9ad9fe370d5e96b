use crate::application::scratch::ScratchDir;
use crate::config::AppConfig;
use crate::domain::clip::{ClipMode, TimeRange};
use crate::domain::error::ClipError;
use crate::domain::media::{ClipRequest, ClipResponse};
use crate::domain::timecode::{parse_with_mode, TimestampMode};
use crate::ports::downloader::VideoDownloader;
use crate::ports::uploader::MediaUploader;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Anything smaller is treated as a placeholder the extractor left behind.
pub const MIN_OUTPUT_BYTES: u64 = 1000;

#[derive(Clone, Debug)]
pub struct ClipSettings {
    pub tmp_dir: PathBuf,
    pub clip_mode: ClipMode,
    pub timestamp_mode: TimestampMode,
    pub min_output_bytes: u64,
}

impl ClipSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            tmp_dir: config.tmp_dir.clone(),
            clip_mode: config.clip_mode,
            timestamp_mode: config.timestamp_mode,
            min_output_bytes: MIN_OUTPUT_BYTES,
        }
    }
}

/// Runs one clip request end to end: validate, download, verify, upload.
///
/// Each request downloads into its own [`ScratchDir`], so nothing it wrote
/// is left on disk once `handle` returns, whichever step failed.
pub struct ClipService<D, U> {
    downloader: D,
    uploader: U,
    settings: ClipSettings,
}

impl<D, U> ClipService<D, U>
where
    D: VideoDownloader,
    U: MediaUploader,
{
    pub fn new(downloader: D, uploader: U, settings: ClipSettings) -> Self {
        Self {
            downloader,
            uploader,
            settings,
        }
    }

    pub async fn handle(&self, request: ClipRequest) -> Result<ClipResponse, ClipError> {
        let url = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ClipError::Validation("URL is required".to_string()))?;

        let start = request.start_or_default();
        let end = request.end_or_default();
        let mode = self.settings.timestamp_mode;
        let range = TimeRange::new(
            parse_with_mode(start, "start", mode)?,
            parse_with_mode(end, "end", mode)?,
        );
        let window = range.window(self.settings.clip_mode);

        let video_id = new_video_id();
        tokio::fs::create_dir_all(&self.settings.tmp_dir).await?;
        let scratch = ScratchDir::new(&self.settings.tmp_dir, &video_id)?;

        tracing::info!(
            %video_id,
            url,
            start_seconds = range.start_seconds,
            end_seconds = range.end_seconds,
            duration = range.clamped_duration(),
            ?window,
            "Downloading clip"
        );

        let download = self
            .downloader
            .download(url, window, scratch.media_path())
            .await
            .map_err(|e| ClipError::DownloadFailure(e.to_string()))?;

        let size = self.verify_output(&download.local_path).await?;
        tracing::info!(%video_id, size, title = %download.title, "Download verified");

        let upload = self
            .uploader
            .upload(&download.local_path, &video_id)
            .await
            .map_err(|e| ClipError::UploadFailure(e.to_string()))?;

        tracing::info!(%video_id, hosted_url = %upload.hosted_url, "Clip uploaded");

        Ok(ClipResponse::success(
            video_id,
            download.title,
            upload,
            start,
            end,
        ))
    }

    async fn verify_output(&self, path: &Path) -> Result<u64, ClipError> {
        match file_size(path).await? {
            None => Err(ClipError::DownloadFailure(
                "Downloaded file not found".to_string(),
            )),
            Some(size) if size < self.settings.min_output_bytes => {
                Err(ClipError::DownloadFailure(format!(
                    "Downloaded file is too small ({} bytes), the video may be unavailable",
                    size
                )))
            }
            Some(size) => Ok(size),
        }
    }
}

/// Size of the file on disk, `None` if it does not exist.
async fn file_size(path: &Path) -> io::Result<Option<u64>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Short random identifier, also used as the hosted public id.
fn new_video_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clip::{ClipWindow, MAX_CLIP_SECONDS};
    use crate::domain::media::{DownloadResult, UploadResult};
    use crate::ports::downloader::MockVideoDownloader;
    use crate::ports::uploader::MockMediaUploader;
    use tempfile::{tempdir, TempDir};

    fn settings(dir: &TempDir) -> ClipSettings {
        ClipSettings {
            tmp_dir: dir.path().to_path_buf(),
            clip_mode: ClipMode::Clip,
            timestamp_mode: TimestampMode::Lenient,
            min_output_bytes: MIN_OUTPUT_BYTES,
        }
    }

    fn request(url: &str, start: &str, end: &str) -> ClipRequest {
        ClipRequest {
            url: Some(url.to_string()),
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }

    fn write_video(path: &Path, bytes: usize) -> DownloadResult {
        std::fs::write(path, vec![0u8; bytes]).unwrap();
        DownloadResult {
            local_path: path.to_path_buf(),
            title: "Cat video".to_string(),
        }
    }

    fn hosted(public_id: &str) -> UploadResult {
        UploadResult {
            hosted_url: format!(
                "https://res.cloudinary.com/demo/video/upload/clipengine/{}.mp4",
                public_id
            ),
            duration: Some(30.0),
        }
    }

    fn files_left(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_missing_url_is_rejected() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader.expect_download().times(0);
        let mut uploader = MockMediaUploader::new();
        uploader.expect_upload().times(0);

        let service = ClipService::new(downloader, uploader, settings(&dir));

        let err = service.handle(ClipRequest::default()).await.unwrap_err();
        assert_eq!(err, ClipError::Validation("URL is required".to_string()));

        let err = service.handle(request("   ", "00:00", "00:10")).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_successful_clip() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader
            .expect_download()
            .withf(|url, window, _| {
                url == "https://example.com/v"
                    && *window
                        == ClipWindow::Section {
                            start_seconds: 10,
                            duration_seconds: 30,
                        }
            })
            .times(1)
            .returning(|_, _, path| Ok(write_video(path, 4096)));

        let mut uploader = MockMediaUploader::new();
        uploader
            .expect_upload()
            .withf(|path, public_id| path.exists() && path.ends_with(format!("{}.mp4", public_id)))
            .times(1)
            .returning(|_, public_id| Ok(hosted(public_id)));

        let service = ClipService::new(downloader, uploader, settings(&dir));
        let resp = service
            .handle(request("https://example.com/v", "00:10", "00:40"))
            .await
            .unwrap();

        assert_eq!(resp.status, "success");
        assert_eq!(resp.clip_range, "00:10 - 00:40");
        assert_eq!(resp.title, "Cat video");
        assert_eq!(resp.video_id.len(), 8);
        assert!(resp.url.ends_with(&format!("{}.mp4", resp.video_id)));
        assert_eq!(resp.duration, Some(30.0));
        assert_eq!(files_left(&dir), 0);
    }

    #[tokio::test]
    async fn test_long_range_is_clamped() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader
            .expect_download()
            .withf(|_, window, _| {
                *window
                    == ClipWindow::Section {
                        start_seconds: 60,
                        duration_seconds: 120,
                    }
            })
            .times(1)
            .returning(|_, _, path| Ok(write_video(path, 4096)));
        let mut uploader = MockMediaUploader::new();
        uploader
            .expect_upload()
            .returning(|_, public_id| Ok(hosted(public_id)));

        let service = ClipService::new(downloader, uploader, settings(&dir));
        let resp = service
            .handle(request("https://example.com/v", "01:00", "1:00:00"))
            .await
            .unwrap();
        // the reported range echoes the request untouched
        assert_eq!(resp.clip_range, "01:00 - 1:00:00");
    }

    #[tokio::test]
    async fn test_full_mode_downloads_whole_video() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader
            .expect_download()
            .withf(|_, window, _| *window == ClipWindow::Whole)
            .times(1)
            .returning(|_, _, path| Ok(write_video(path, 4096)));
        let mut uploader = MockMediaUploader::new();
        uploader
            .expect_upload()
            .returning(|_, public_id| Ok(hosted(public_id)));

        let mut settings = settings(&dir);
        settings.clip_mode = ClipMode::Full;
        let service = ClipService::new(downloader, uploader, settings);
        assert!(service
            .handle(request("https://example.com/v", "00:00", "59:00"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_malformed_timestamp_is_zero_in_lenient_mode() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader
            .expect_download()
            .withf(|_, window, _| {
                *window
                    == ClipWindow::Section {
                        start_seconds: 0,
                        duration_seconds: 40,
                    }
            })
            .times(1)
            .returning(|_, _, path| Ok(write_video(path, 4096)));
        let mut uploader = MockMediaUploader::new();
        uploader
            .expect_upload()
            .returning(|_, public_id| Ok(hosted(public_id)));

        let service = ClipService::new(downloader, uploader, settings(&dir));
        let resp = service
            .handle(request("https://example.com/v", "later", "00:40"))
            .await
            .unwrap();
        assert_eq!(resp.clip_range, "later - 00:40");
    }

    #[tokio::test]
    async fn test_malformed_timestamp_is_rejected_in_strict_mode() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader.expect_download().times(0);
        let uploader = MockMediaUploader::new();

        let mut settings = settings(&dir);
        settings.timestamp_mode = TimestampMode::Strict;
        let service = ClipService::new(downloader, uploader, settings);

        let err = service
            .handle(request("https://example.com/v", "00:10", "soon"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClipError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_download_is_a_failure() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader
            .expect_download()
            .times(1)
            .returning(|_, _, path| Ok(write_video(path, 0)));
        let mut uploader = MockMediaUploader::new();
        uploader.expect_upload().times(0);

        let service = ClipService::new(downloader, uploader, settings(&dir));
        let err = service
            .handle(request("https://example.com/v", "00:10", "00:40"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClipError::DownloadFailure(_)));
        assert!(err.to_string().contains("0 bytes"));
        assert_eq!(err.status_code(), 500);
        assert_eq!(files_left(&dir), 0);
    }

    #[tokio::test]
    async fn test_missing_download_is_a_failure() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader.expect_download().times(1).returning(|_, _, path| {
            Ok(DownloadResult {
                local_path: path.to_path_buf(),
                title: "video".to_string(),
            })
        });
        let mut uploader = MockMediaUploader::new();
        uploader.expect_upload().times(0);

        let service = ClipService::new(downloader, uploader, settings(&dir));
        let err = service
            .handle(request("https://example.com/v", "00:10", "00:40"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClipError::DownloadFailure("Downloaded file not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_downloader_error_cleans_partial_file() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader.expect_download().times(1).returning(|_, _, path| {
            std::fs::write(path, b"partial").unwrap();
            Err("yt-dlp exited with exit status: 1: ERROR: Video unavailable".into())
        });
        let mut uploader = MockMediaUploader::new();
        uploader.expect_upload().times(0);

        let service = ClipService::new(downloader, uploader, settings(&dir));
        let err = service
            .handle(request("https://example.com/v", "00:10", "00:40"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClipError::DownloadFailure(_)));
        assert!(err.to_string().contains("Video unavailable"));
        assert_eq!(files_left(&dir), 0);
    }

    #[tokio::test]
    async fn test_failed_postprocessing_leaves_no_intermediates() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader.expect_download().times(1).returning(|_, _, path| {
            std::fs::write(path, vec![0u8; 4096]).unwrap();
            std::fs::write(path.with_extension("temp.mp4"), vec![0u8; 4096]).unwrap();
            Err("yt-dlp exited with exit status: 1: ERROR: Postprocessing failed".into())
        });
        let mut uploader = MockMediaUploader::new();
        uploader.expect_upload().times(0);

        let service = ClipService::new(downloader, uploader, settings(&dir));
        let err = service
            .handle(request("https://example.com/v", "00:10", "00:40"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClipError::DownloadFailure(_)));
        assert_eq!(files_left(&dir), 0);
    }

    #[tokio::test]
    async fn test_upload_uses_path_reported_by_downloader() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader.expect_download().times(1).returning(|_, _, path| {
            let remuxed = path.with_extension("mkv");
            std::fs::write(&remuxed, vec![0u8; 4096]).unwrap();
            Ok(DownloadResult {
                local_path: remuxed,
                title: "Cat video".to_string(),
            })
        });
        let mut uploader = MockMediaUploader::new();
        uploader
            .expect_upload()
            .withf(|path, _| path.extension().is_some_and(|ext| ext == "mkv"))
            .times(1)
            .returning(|_, public_id| Ok(hosted(public_id)));

        let service = ClipService::new(downloader, uploader, settings(&dir));
        assert!(service
            .handle(request("https://example.com/v", "00:10", "00:40"))
            .await
            .is_ok());
        assert_eq!(files_left(&dir), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_timestamps_do_not_panic() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader
            .expect_download()
            .withf(|_, window, _| {
                *window
                    == ClipWindow::Section {
                        start_seconds: i64::MAX as u64,
                        duration_seconds: 1 - i64::MAX,
                    }
            })
            .times(1)
            .returning(|_, _, path| Ok(write_video(path, 4096)));
        let mut uploader = MockMediaUploader::new();
        uploader
            .expect_upload()
            .returning(|_, public_id| Ok(hosted(public_id)));

        let service = ClipService::new(downloader, uploader, settings(&dir));
        assert!(service
            .handle(request("https://example.com/v", "0:9223372036854775807", "00:01"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_oversized_end_is_clamped() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader
            .expect_download()
            .withf(|_, window, _| {
                *window
                    == ClipWindow::Section {
                        start_seconds: 0,
                        duration_seconds: MAX_CLIP_SECONDS,
                    }
            })
            .times(1)
            .returning(|_, _, path| Ok(write_video(path, 4096)));
        let mut uploader = MockMediaUploader::new();
        uploader
            .expect_upload()
            .returning(|_, public_id| Ok(hosted(public_id)));

        let service = ClipService::new(downloader, uploader, settings(&dir));
        assert!(service
            .handle(request("https://example.com/v", "00:00", "0:9223372036854775807"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_upload_failure_still_cleans_up() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader
            .expect_download()
            .times(1)
            .returning(|_, _, path| Ok(write_video(path, 4096)));
        let mut uploader = MockMediaUploader::new();
        uploader
            .expect_upload()
            .times(1)
            .returning(|_, _| Err("Upload rejected (401): Invalid Signature".into()));

        let service = ClipService::new(downloader, uploader, settings(&dir));
        let err = service
            .handle(request("https://example.com/v", "00:10", "00:40"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ClipError::UploadFailure("Upload rejected (401): Invalid Signature".to_string())
        );
        assert_eq!(files_left(&dir), 0);
    }

    #[tokio::test]
    async fn test_each_request_gets_a_new_id() {
        let dir = tempdir().unwrap();
        let mut downloader = MockVideoDownloader::new();
        downloader
            .expect_download()
            .times(2)
            .returning(|_, _, path| Ok(write_video(path, 4096)));
        let mut uploader = MockMediaUploader::new();
        uploader
            .expect_upload()
            .times(2)
            .returning(|_, public_id| Ok(hosted(public_id)));

        let service = ClipService::new(downloader, uploader, settings(&dir));
        let first = service
            .handle(request("https://example.com/v", "00:10", "00:40"))
            .await
            .unwrap();
        let second = service
            .handle(request("https://example.com/v", "00:10", "00:40"))
            .await
            .unwrap();
        assert_ne!(first.video_id, second.video_id);
    }
}
