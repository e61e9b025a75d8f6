// OAuth user credentials (`"type": "authorized_user"`), as written by
// `gcloud auth application-default login`. A long-lived refresh token is
// traded for access tokens with the `refresh_token` grant.

use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::token_cache::{exchange, TokenCache, DEFAULT_TOKEN_URI};
use crate::core::auth::TokenProvider;
use crate::core::error::AuthError;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUserCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl AuthorizedUserCredentials {
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let credentials: AuthorizedUserCredentials = serde_json::from_str(json)
            .map_err(|e| AuthError::InvalidCredentials(format!("authorized_user file: {}", e)))?;
        if credentials.refresh_token.is_empty() {
            return Err(AuthError::InvalidCredentials(
                "authorized_user file has an empty refresh_token".into(),
            ));
        }
        Ok(credentials)
    }
}

pub struct AuthorizedUserAuth {
    credentials: AuthorizedUserCredentials,
    client: Client,
    cache: TokenCache,
}

impl AuthorizedUserAuth {
    pub fn new(credentials: AuthorizedUserCredentials) -> Self {
        Self {
            credentials,
            client: Client::new(),
            cache: TokenCache::new(),
        }
    }

    pub async fn from_file(path: &Path) -> Result<Self, AuthError> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(AuthorizedUserCredentials::from_json(&content)?))
    }
}

#[async_trait]
impl TokenProvider for AuthorizedUserAuth {
    /// Scopes were fixed when the refresh token was granted; they only key the cache.
    async fn access_token(&self, scopes: &[String]) -> Result<String, AuthError> {
        let now = SystemTime::now();
        if let Some(token) = self.cache.get(scopes, now) {
            return Ok(token);
        }

        tracing::debug!("Refreshing access token for client {}", self.credentials.client_id);
        let response = exchange(
            &self.client,
            &self.credentials.token_uri,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ],
        )
        .await?;

        self.cache
            .insert(scopes, &response.access_token, response.expires_in, now);
        Ok(response.access_token)
    }

    fn describe(&self) -> String {
        format!("authorized user (client {})", self.credentials.client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gcloud_files() {
        let credentials = AuthorizedUserCredentials::from_json(
            r#"{
                "type": "authorized_user",
                "client_id": "123.apps.googleusercontent.com",
                "client_secret": "shh",
                "refresh_token": "1//refresh"
            }"#,
        )
        .unwrap();
        assert_eq!(credentials.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(credentials.refresh_token, "1//refresh");
    }

    #[test]
    fn missing_fields_are_invalid() {
        let err = AuthorizedUserCredentials::from_json(r#"{"client_id": "x"}"#).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn describe_never_leaks_secrets() {
        let auth = AuthorizedUserAuth::new(AuthorizedUserCredentials {
            client_id: "cid".into(),
            client_secret: "secret".into(),
            refresh_token: "refresh".into(),
            token_uri: DEFAULT_TOKEN_URI.into(),
        });
        let text = auth.describe();
        assert!(text.contains("cid"));
        assert!(!text.contains("secret"));
        assert!(!text.contains("refresh"));
    }
}
