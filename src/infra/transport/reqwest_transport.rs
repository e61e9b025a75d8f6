//! Authenticated HTTP transport for the Google REST APIs.
//!
//! Each request asks the token provider for a token carrying the request's
//! scopes, then maps Google's response conventions (error envelopes, 429,
//! empty bodies) onto `GoogleError`.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};

use async_trait::async_trait;

use crate::core::auth::TokenProvider;
use crate::core::error::{GoogleError, Result};
use crate::core::transport::{ApiRequest, GoogleTransport, HttpMethod, RequestBody};
use crate::infra::config::Config;

pub struct ReqwestTransport<P: TokenProvider> {
    client: Client,
    tokens: P,
}

impl<P: TokenProvider> ReqwestTransport<P> {
    pub fn new(tokens: P, config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GoogleError::Http(format!("Failed to build HTTP client: {}", e)))?;

        debug!("HTTP transport ready, authenticating with {}", tokens.describe());
        Ok(Self { client, tokens })
    }

    async fn build(&self, request: ApiRequest) -> Result<RequestBuilder> {
        let token = self.tokens.access_token(&request.scopes).await?;

        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        };

        let builder = self
            .client
            .request(method, &request.url)
            .query(&request.query)
            .bearer_auth(token);

        Ok(match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Raw {
                content_type,
                bytes,
            } => builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(bytes),
        })
    }

    /// Sends the request and returns the raw body, turning
    /// rate limits and error envelopes into errors.
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>> {
        debug!("Executing Google API request {}", request);
        let builder = self.build(request).await?;

        let response = builder
            .send()
            .await
            .map_err(|e| GoogleError::Http(e.to_string()))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate limited by Google API");
            return Err(GoogleError::RateLimited);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GoogleError::Http(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let err = api_error(status, &body);
            error!("{}", err);
            return Err(err);
        }

        Ok(body.to_vec())
    }
}

/// Builds `Api { status, message }` from Google's error envelope:
/// `{"error": {"code": 400, "message": "..."}}`. Falls back to the raw body.
fn api_error(status: StatusCode, body: &[u8]) -> GoogleError {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let envelope = parsed.as_ref().and_then(|v| v.get("error"));

    if let Some(message) = envelope
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        let code = envelope
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(status.as_u16());
        return GoogleError::Api {
            status: code,
            message: message.to_string(),
        };
    }

    // OAuth style errors put a string in `error`.
    let message = envelope
        .and_then(|e| e.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                format!("HTTP {}", status)
            } else {
                text
            }
        });
    GoogleError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl<P: TokenProvider> GoogleTransport for ReqwestTransport<P> {
    async fn send_json(&self, request: ApiRequest) -> Result<Value> {
        let body = self.execute(request).await?;

        // Empty successful responses (e.g. DELETE)
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        serde_json::from_slice(&body).map_err(|e| {
            GoogleError::Decode(format!(
                "{} (body: {})",
                e,
                String::from_utf8_lossy(&body)
            ))
        })
    }

    async fn send_bytes(&self, request: ApiRequest) -> Result<Vec<u8>> {
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_from_google_envelope() {
        let body = br#"{"error": {"code": 400, "message": "Invalid request format"}}"#;
        let err = api_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, GoogleError::Api { status: 400, .. }));
        assert_eq!(err.to_string(), "Google API error 400: Invalid request format");
    }

    #[test]
    fn falls_back_to_the_body_text() {
        let err = api_error(StatusCode::BAD_GATEWAY, b"upstream unavailable");
        assert_eq!(err.to_string(), "Google API error 502: upstream unavailable");

        let err = api_error(StatusCode::NOT_FOUND, b"");
        assert_eq!(err.to_string(), "Google API error 404: HTTP 404 Not Found");
    }

    #[test]
    fn oauth_style_errors_keep_their_code_name() {
        let err = api_error(StatusCode::UNAUTHORIZED, br#"{"error": "invalid_grant"}"#);
        assert_eq!(err.to_string(), "Google API error 401: invalid_grant");
    }
}
