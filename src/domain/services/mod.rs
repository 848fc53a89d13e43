pub mod bookmark_api;
