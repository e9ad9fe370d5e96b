//! Domain layer - Pure business logic.

pub mod clip;
pub mod error;
pub mod media;
pub mod timecode;
