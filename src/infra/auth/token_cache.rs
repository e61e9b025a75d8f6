// Access tokens cached per scope set, plus the form POST shared by every
// OAuth grant that ends at Google's token endpoint.

use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;

use crate::core::auth::scope_key;
use crate::core::error::AuthError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are refreshed this long before Google says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    #[allow(dead_code)]
    #[serde(default)]
    pub token_type: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

#[derive(Debug, Default)]
pub struct TokenCache {
    tokens: DashMap<String, CachedToken>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cached token for `scopes` that is still good at `now`.
    pub fn get(&self, scopes: &[String], now: SystemTime) -> Option<String> {
        let entry = self.tokens.get(&scope_key(scopes))?;
        if entry.expires_at > now + EXPIRY_MARGIN {
            Some(entry.token.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, scopes: &[String], token: &str, expires_in: u64, now: SystemTime) {
        self.tokens.insert(
            scope_key(scopes),
            CachedToken {
                token: token.to_string(),
                expires_at: now + Duration::from_secs(expires_in),
            },
        );
    }
}

/// POSTs an OAuth grant form to `token_uri`.
pub async fn exchange(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| AuthError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;
        return Err(AuthError::TokenExchange {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| AuthError::Http(format!("Invalid token response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokens_are_shared_across_scope_orderings() {
        let cache = TokenCache::new();
        let now = SystemTime::now();
        cache.insert(&scopes(&["a", "b"]), "tok", 3600, now);

        assert_eq!(cache.get(&scopes(&["b", "a"]), now).as_deref(), Some("tok"));
        assert_eq!(cache.get(&scopes(&["a"]), now), None);
    }

    #[test]
    fn tokens_expire_a_minute_early() {
        let cache = TokenCache::new();
        let now = SystemTime::now();
        cache.insert(&scopes(&["a"]), "tok", 3600, now);

        assert!(cache.get(&scopes(&["a"]), now + Duration::from_secs(3500)).is_some());
        assert!(cache.get(&scopes(&["a"]), now + Duration::from_secs(3541)).is_none());
    }

    #[test]
    fn token_responses_default_their_lifetime() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "ya29.x"}"#).unwrap();
        assert_eq!(response.expires_in, 3600);
    }
}
