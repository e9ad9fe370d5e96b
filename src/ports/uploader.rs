use crate::domain::media::UploadResult;
use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload a local video file under `public_id`.
    /// The returned URL may point at media the provider is still transcoding.
    async fn upload(
        &self,
        local_path: &Path,
        public_id: &str,
    ) -> Result<UploadResult, Box<dyn Error + Send + Sync>>;
}
