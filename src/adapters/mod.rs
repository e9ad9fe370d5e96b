//! Adapters - Concrete implementations of ports.

pub mod cloudinary;
pub mod ytdlp;

pub use cloudinary::CloudinaryUploader;
pub use ytdlp::YtDlpDownloader;
