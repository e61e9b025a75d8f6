use thiserror::Error;

/// Failures while locating credentials or exchanging them for an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No Google credentials found. Searched: {}", searched.join(", "))]
    NoCredentials { searched: Vec<String> },
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("Unsupported credential type '{0}'. Use a service account key or an authorized_user file")]
    UnsupportedCredentialType(String),
    #[error("Failed to sign token request: {0}")]
    Signing(String),
    #[error("Token exchange failed ({status}): {body}")]
    TokenExchange { status: u16, body: String },
    #[error("HTTP error during token exchange: {0}")]
    Http(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by every Workspace service.
#[derive(Debug, Error)]
pub enum GoogleError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Google API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Rate limited by Google API. Please try again later.")]
    RateLimited,
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Expected a file of type {expected}, got {actual}")]
    WrongMimeType { expected: String, actual: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Shape mismatch: expected {expected:?} (rows, columns), got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

impl From<serde_json::Error> for GoogleError {
    fn from(err: serde_json::Error) -> Self {
        GoogleError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GoogleError>;
