//! V4 signed URLs for Cloud Storage objects.
//!
//! Query-string signing with the `GOOG4-RSA-SHA256` algorithm: a canonical
//! request is hashed, wrapped in a string-to-sign, and signed with the
//! service account's RSA key. Anyone holding the URL can use it until it
//! expires, no credentials needed.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey};
use sha2::{Digest, Sha256};

use crate::core::error::{AuthError, GoogleError, Result};
use crate::core::storage::encode_object_name;
use crate::core::transport::HttpMethod;
use crate::infra::auth::ServiceAccountKey;

const HOST: &str = "storage.googleapis.com";
const ALGORITHM: &str = "GOOG4-RSA-SHA256";
const SIGNED_HEADERS: &str = "host";

pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(30 * 60);
/// Longest lifetime Cloud Storage accepts for a V4 signature.
pub const MAX_EXPIRATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub struct V4Signer {
    client_email: String,
    key: EncodingKey,
}

impl V4Signer {
    pub fn new(service_account: &ServiceAccountKey) -> Result<Self> {
        Ok(Self {
            client_email: service_account.client_email.clone(),
            key: service_account.encoding_key()?,
        })
    }

    /// A URL granting `method` on `gs://bucket/object` from `now` until
    /// `now + expiration` (30 minutes when `None`, never more than 7 days).
    pub fn signed_url(
        &self,
        bucket: &str,
        object_name: &str,
        method: HttpMethod,
        expiration: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if bucket.is_empty() || object_name.is_empty() {
            return Err(GoogleError::InvalidArgument(
                "bucket and object name are required".into(),
            ));
        }

        let mut expiration = expiration.unwrap_or(DEFAULT_EXPIRATION);
        if expiration.as_secs() == 0 {
            return Err(GoogleError::InvalidArgument(
                "signed URL expiration must be at least one second".into(),
            ));
        }
        if expiration > MAX_EXPIRATION {
            tracing::warn!(
                "Signed URL expiration of {}s capped at 7 days",
                expiration.as_secs()
            );
            expiration = MAX_EXPIRATION;
        }

        let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = now.format("%Y%m%d").to_string();
        let credential_scope = format!("{}/auto/storage/goog4_request", datestamp);

        let canonical_uri = format!("/{}/{}", bucket, encode_object_name(object_name));
        let mut query = vec![
            ("X-Goog-Algorithm", ALGORITHM.to_string()),
            (
                "X-Goog-Credential",
                format!("{}/{}", self.client_email, credential_scope),
            ),
            ("X-Goog-Date", timestamp.clone()),
            ("X-Goog-Expires", expiration.as_secs().to_string()),
            ("X-Goog-SignedHeaders", SIGNED_HEADERS.to_string()),
        ];
        query.sort_by(|a, b| a.0.cmp(b.0));
        let canonical_query = query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = [
            method.to_string(),
            canonical_uri.clone(),
            canonical_query.clone(),
            format!("host:{}\n", HOST),
            SIGNED_HEADERS.to_string(),
            "UNSIGNED-PAYLOAD".to_string(),
        ]
        .join("\n");

        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            timestamp,
            credential_scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );
        let signature = self.sign_hex(&string_to_sign)?;

        tracing::debug!(
            "Signed {} URL for gs://{}/{} valid {}s",
            method,
            bucket,
            object_name,
            expiration.as_secs()
        );
        Ok(format!(
            "https://{}{}?{}&X-Goog-Signature={}",
            HOST, canonical_uri, canonical_query, signature
        ))
    }

    /// RSA-SHA256 signature of `message`, hex encoded.
    fn sign_hex(&self, message: &str) -> Result<String> {
        let signature = jsonwebtoken::crypto::sign(message.as_bytes(), &self.key, Algorithm::RS256)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        let raw = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        Ok(hex::encode(raw))
    }
}
