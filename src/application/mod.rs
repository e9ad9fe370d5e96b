//! Application layer - Services that drive the ports.

pub mod clip_service;
pub mod scratch;
