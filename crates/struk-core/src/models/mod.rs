//! Data models shared across the engine.

pub mod config;
pub mod receipt;
