//! Ports - Trait definitions for the external collaborators.

pub mod downloader;
pub mod uploader;
