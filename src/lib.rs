//! ClipEngine - Video Clip Service
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (timestamps, clip policy, errors)
//! - ports/: Trait definitions for the extractor and the media host
//! - adapters/: Concrete implementations (yt-dlp, Cloudinary)
//! - application/: The clip pipeline service
//! - http: axum inbound adapter
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod ports;

pub use application::clip_service::{ClipService, ClipSettings};
pub use config::AppConfig;
