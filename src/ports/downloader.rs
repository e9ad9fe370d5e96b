use crate::domain::clip::ClipWindow;
use crate::domain::media::DownloadResult;
use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Fetch `url` (restricted to `window`) into `output_path`.
    /// The file may be missing or truncated even on `Ok`; callers verify it.
    async fn download(
        &self,
        url: &str,
        window: ClipWindow,
        output_path: &Path,
    ) -> Result<DownloadResult, Box<dyn Error + Send + Sync>>;
}
