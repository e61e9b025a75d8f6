// Token providers for the three credential kinds and the resolver that picks one.

mod authorized_user;
mod credential_resolver;
mod service_account;
mod static_token;
mod token_cache;

pub use authorized_user::{AuthorizedUserAuth, AuthorizedUserCredentials};
pub use credential_resolver::{CredentialResolver, Credentials, ResolvedCredentials};
pub use service_account::{ServiceAccountAuth, ServiceAccountKey};
pub use static_token::StaticToken;
pub use token_cache::DEFAULT_TOKEN_URI;
