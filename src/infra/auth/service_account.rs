// =============================================================================
// SERVICE ACCOUNT AUTHENTICATION
// =============================================================================
//
// The JWT bearer flow: sign a short-lived assertion with the key's RSA private
// key and trade it for an access token at the key's token URI. With a subject
// set, the token acts as that user (domain-wide delegation).

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::token_cache::{exchange, TokenCache, DEFAULT_TOKEN_URI};
use crate::core::auth::TokenProvider;
use crate::core::error::AuthError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertions are valid for an hour, the most Google accepts.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Service account JSON key file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// The service account email (used as issuer in JWT).
    pub client_email: String,

    /// The private key in PEM format.
    pub private_key: String,

    #[serde(default)]
    pub private_key_id: Option<String>,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| AuthError::InvalidCredentials(format!("service account key: {}", e)))?;
        if key.client_email.is_empty() || key.private_key.is_empty() {
            return Err(AuthError::InvalidCredentials(
                "service account key needs client_email and private_key".into(),
            ));
        }
        Ok(key)
    }

    pub fn encoding_key(&self) -> Result<EncodingKey, AuthError> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    iss: String,
    /// Space separated scopes.
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
}

pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    subject: Option<String>,
    client: Client,
    cache: TokenCache,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            subject: None,
            client: Client::new(),
            cache: TokenCache::new(),
        }
    }

    pub async fn from_file(path: &Path) -> Result<Self, AuthError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        Ok(Self::new(ServiceAccountKey::from_json(json)?))
    }

    /// Act as `subject` (an email in the key's Workspace domain).
    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject;
        self
    }

    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Signs the assertion exchanged for a token carrying `scopes`.
    fn assertion(&self, scopes: &[String], now: u64) -> Result<String, AuthError> {
        let claims = JwtClaims {
            iss: self.key.client_email.clone(),
            scope: scopes.join(" "),
            aud: self.key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
            sub: self.subject.clone(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        encode(&header, &claims, &self.key.encoding_key()?)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self, scopes: &[String]) -> Result<String, AuthError> {
        let now = SystemTime::now();
        if let Some(token) = self.cache.get(scopes, now) {
            return Ok(token);
        }

        let issued_at = now
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AuthError::Signing(e.to_string()))?
            .as_secs();
        let jwt = self.assertion(scopes, issued_at)?;

        let response = exchange(
            &self.client,
            &self.key.token_uri,
            &[("grant_type", JWT_BEARER_GRANT), ("assertion", &jwt)],
        )
        .await?;

        tracing::debug!(
            "Fetched service account token for {} ({} scope(s))",
            self.key.client_email,
            scopes.len()
        );
        self.cache
            .insert(scopes, &response.access_token, response.expires_in, now);
        Ok(response.access_token)
    }

    fn describe(&self) -> String {
        match &self.subject {
            Some(subject) => format!(
                "service account {} acting as {}",
                self.key.client_email, subject
            ),
            None => format!("service account {}", self.key.client_email),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    pub(crate) const TEST_PEM: &str = include_str!("testdata/test_service_account_key.pem");

    pub(crate) fn key_json() -> String {
        serde_json::json!({
            "type": "service_account",
            "project_id": "demo-project",
            "private_key_id": "kid-1",
            "private_key": TEST_PEM,
            "client_email": "robot@demo-project.iam.gserviceaccount.com",
            "token_uri": "https://oauth2.googleapis.com/token"
        })
        .to_string()
    }

    fn read_claims(jwt: &str) -> JwtClaims {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        decode::<JwtClaims>(jwt, &DecodingKey::from_secret(&[]), &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn assertion_carries_scopes_and_lifetime() {
        let auth = ServiceAccountAuth::from_json(&key_json()).unwrap();
        let scopes = vec!["scope-a".to_string(), "scope-b".to_string()];

        let claims = read_claims(&auth.assertion(&scopes, 1_700_000_000).unwrap());

        assert_eq!(claims.iss, "robot@demo-project.iam.gserviceaccount.com");
        assert_eq!(claims.scope, "scope-a scope-b");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.sub, None);
    }

    #[test]
    fn subject_is_added_for_delegation() {
        let auth = ServiceAccountAuth::from_json(&key_json())
            .unwrap()
            .with_subject(Some("admin@example.com".into()));

        let claims = read_claims(&auth.assertion(&["s".to_string()], 1).unwrap());

        assert_eq!(claims.sub.as_deref(), Some("admin@example.com"));
        assert!(auth.describe().contains("acting as admin@example.com"));
    }

    #[test]
    fn token_uri_defaults_when_missing() {
        let json = serde_json::json!({
            "client_email": "robot@x.iam.gserviceaccount.com",
            "private_key": TEST_PEM
        });
        let key = ServiceAccountKey::from_json(&json.to_string()).unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(key.project_id, None);
    }

    #[test]
    fn rejects_keys_without_a_private_key() {
        let json = r#"{"client_email": "robot@x", "private_key": ""}"#;
        assert!(matches!(
            ServiceAccountKey::from_json(json),
            Err(AuthError::InvalidCredentials(_))
        ));
        let json = r#"{"client_email": "robot@x", "private_key": "not a pem"}"#;
        let auth = ServiceAccountAuth::from_json(json).unwrap();
        assert!(matches!(
            auth.assertion(&[], 1),
            Err(AuthError::Signing(_))
        ));
    }

    #[tokio::test]
    async fn cached_tokens_skip_the_exchange() {
        let auth = ServiceAccountAuth::from_json(&key_json()).unwrap();
        let scopes = vec!["scope-a".to_string()];
        auth.cache.insert(&scopes, "ya29.cached", 3600, SystemTime::now());

        assert_eq!(auth.access_token(&scopes).await.unwrap(), "ya29.cached");
    }
}
