use thiserror::Error;

/// Failures of the clip pipeline, each mapped to an HTTP status.
///
/// Messages are surfaced to the caller unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    DownloadFailure(String),
    #[error("{0}")]
    UploadFailure(String),
    #[error("{0}")]
    Unexpected(String),
}

impl ClipError {
    pub fn status_code(&self) -> u16 {
        match self {
            ClipError::Validation(_) => 400,
            ClipError::DownloadFailure(_)
            | ClipError::UploadFailure(_)
            | ClipError::Unexpected(_) => 500,
        }
    }

    /// Short machine-friendly name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ClipError::Validation(_) => "validation",
            ClipError::DownloadFailure(_) => "download_failure",
            ClipError::UploadFailure(_) => "upload_failure",
            ClipError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<std::io::Error> for ClipError {
    fn from(err: std::io::Error) -> Self {
        ClipError::Unexpected(err.to_string())
    }
}
