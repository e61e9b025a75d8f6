// The infra module contains implementations of core traits.
// Each concern gets its own submodule.

#[path = "transport/mod.rs"]
pub mod transport;

#[path = "auth/mod.rs"]
pub mod auth;

#[path = "config.rs"]
pub mod config;

#[path = "storage/mod.rs"]
pub mod storage;

#[path = "image_download.rs"]
pub mod image_download;
