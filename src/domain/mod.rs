// src/domain/mod.rs
pub mod credentials;
pub mod error;
pub mod parser;
pub mod progress;
pub mod row;
pub mod services;
pub mod validation;
