use async_trait::async_trait;

use crate::core::auth::TokenProvider;
use crate::core::error::AuthError;

/// A pre-issued access token, used as is for every scope.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self, _scopes: &[String]) -> Result<String, AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::InvalidCredentials("empty access token".into()));
        }
        Ok(self.token.clone())
    }

    fn describe(&self) -> String {
        "pre-issued access token".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hands_out_the_same_token() {
        let provider = StaticToken::new("ya29.abc");
        assert_eq!(provider.access_token(&[]).await.unwrap(), "ya29.abc");
        assert!(StaticToken::new("").access_token(&[]).await.is_err());
    }
}
