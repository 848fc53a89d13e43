// src/application/mod.rs
pub mod engine;
pub mod error;
pub mod import_service;
pub mod pacing;
pub mod session;

// Re-export key services for easier imports
pub use engine::{ImportConfig, ImportConfigBuilder, ImportEngine};
pub use import_service::ImportService;
