pub mod client;
mod model;

pub use client::{ProxyClient, ADD_TIMEOUT, AUTH_TIMEOUT};
