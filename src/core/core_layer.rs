// The core module holds the domain: API registry, models, typed requests
// and the services built on the transport and token traits.
// Each Google API gets its own submodule.

#[path = "error.rs"]
pub mod error;

#[path = "api.rs"]
pub mod api;

#[path = "transport.rs"]
pub mod transport;

#[path = "auth.rs"]
pub mod auth;

#[path = "table.rs"]
pub mod table;

#[path = "drive/mod.rs"]
pub mod drive;

#[path = "sheets/mod.rs"]
pub mod sheets;

#[path = "slides/mod.rs"]
pub mod slides;

#[path = "docs/mod.rs"]
pub mod docs;

#[path = "tasks/mod.rs"]
pub mod tasks;

#[path = "storage/mod.rs"]
pub mod storage;

#[path = "workspace.rs"]
pub mod workspace;
