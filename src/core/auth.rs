use std::sync::Arc;

use async_trait::async_trait;

use super::error::AuthError;

/// Something that can hand out OAuth2 access tokens for a set of scopes.
///
/// Implementations live in the infra layer (service account JWT flow,
/// refresh-token flow, static tokens). The core only cares that a bearer
/// token comes back.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, scopes: &[String]) -> Result<String, AuthError>;

    /// Short human readable description for logs (never includes secrets).
    fn describe(&self) -> String;
}

#[async_trait]
impl<P: TokenProvider + ?Sized> TokenProvider for Arc<P> {
    async fn access_token(&self, scopes: &[String]) -> Result<String, AuthError> {
        (**self).access_token(scopes).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[async_trait]
impl<P: TokenProvider + ?Sized> TokenProvider for Box<P> {
    async fn access_token(&self, scopes: &[String]) -> Result<String, AuthError> {
        (**self).access_token(scopes).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Canonical cache key for a scope set: sorted, deduplicated, space joined.
pub fn scope_key(scopes: &[String]) -> String {
    let mut sorted: Vec<&str> = scopes.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_key_ignores_order_and_duplicates() {
        let a = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        let b = vec!["a".to_string(), "b".to_string()];
        assert_eq!(scope_key(&a), scope_key(&b));
        assert_eq!(scope_key(&b), "a b");
    }
}
