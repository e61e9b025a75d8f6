// Convenience layer over the Google Workspace REST APIs.
//
// **Architecture Overview:**
// - `core/` = Models, typed requests and services (no HTTP client types)
// - `infra/` = Implementations of core traits (reqwest transport, OAuth
//   token providers, credential lookup, URL signing, in-memory fakes)
//
// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;

pub use crate::core::api::GoogleApi;
pub use crate::core::auth::TokenProvider;
pub use crate::core::error::{AuthError, GoogleError, Result};
pub use crate::core::transport::GoogleTransport;
pub use crate::core::workspace::{Workspace, WorkspaceFile};
pub use crate::infra::auth::{CredentialResolver, Credentials, ResolvedCredentials};
pub use crate::infra::config::Config;
pub use crate::infra::transport::ReqwestTransport;
