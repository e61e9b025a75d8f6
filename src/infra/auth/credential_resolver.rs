// Finds credentials by walking a fixed list of places, first hit wins:
//
//   1. the path passed explicitly (`--credentials`)
//   2. $GOOGLE_SERVICE_ACCOUNT_JSON  (inline key JSON)
//   3. $GOOGLE_SERVICE_ACCOUNT_KEY   (path)
//   4. $GOOGLE_APPLICATION_CREDENTIALS (path)
//   5. $GOOGLE_OAUTH_CREDENTIALS     (path to an authorized_user file)
//   6. $HOME/.credentials/service_credentials.json
//   7. ./.credentials/service_credentials.json
//   8. $GOOGLE_OAUTH_ACCESS_TOKEN    (bare access token)
//
// Candidates that are missing, unreadable or malformed are skipped. OAuth
// client secret files stop the search: they need a browser flow.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::authorized_user::{AuthorizedUserAuth, AuthorizedUserCredentials};
use super::service_account::{ServiceAccountAuth, ServiceAccountKey};
use super::static_token::StaticToken;
use crate::core::auth::TokenProvider;
use crate::core::error::AuthError;

const CREDENTIALS_FILE: &str = ".credentials/service_credentials.json";

const PATH_VARIABLES: [&str; 3] = [
    "GOOGLE_SERVICE_ACCOUNT_KEY",
    "GOOGLE_APPLICATION_CREDENTIALS",
    "GOOGLE_OAUTH_CREDENTIALS",
];

#[derive(Debug, Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserCredentials),
    AccessToken(String),
}

impl Credentials {
    /// Picks the credential kind from the file's `type` field. Keys without
    /// one are accepted when they look like a service account key.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| AuthError::InvalidCredentials(format!("not valid JSON: {}", e)))?;

        for client_kind in ["installed", "web"] {
            if value.get(client_kind).is_some() {
                return Err(AuthError::UnsupportedCredentialType(format!(
                    "OAuth client secrets ({})",
                    client_kind
                )));
            }
        }

        match value.get("type").and_then(Value::as_str) {
            Some("service_account") => Ok(Credentials::ServiceAccount(
                ServiceAccountKey::from_json(json)?,
            )),
            Some("authorized_user") => Ok(Credentials::AuthorizedUser(
                AuthorizedUserCredentials::from_json(json)?,
            )),
            Some(other) => Err(AuthError::UnsupportedCredentialType(other.to_string())),
            None if value.get("private_key").is_some() => Ok(Credentials::ServiceAccount(
                ServiceAccountKey::from_json(json)?,
            )),
            None => Err(AuthError::InvalidCredentials(
                "missing the \"type\" field".into(),
            )),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::ServiceAccount(_) => "service account",
            Credentials::AuthorizedUser(_) => "authorized user",
            Credentials::AccessToken(_) => "access token",
        }
    }

    /// The service account key, needed for signing Storage URLs.
    pub fn service_account_key(&self) -> Option<&ServiceAccountKey> {
        match self {
            Credentials::ServiceAccount(key) => Some(key),
            _ => None,
        }
    }

    /// Builds the token provider. `subject` only applies to service accounts.
    pub fn into_provider(self, subject: Option<String>) -> Arc<dyn TokenProvider> {
        match self {
            Credentials::ServiceAccount(key) => {
                Arc::new(ServiceAccountAuth::new(key).with_subject(subject))
            }
            Credentials::AuthorizedUser(credentials) => {
                if subject.is_some() {
                    tracing::warn!("Impersonation needs a service account; ignoring the subject");
                }
                Arc::new(AuthorizedUserAuth::new(credentials))
            }
            Credentials::AccessToken(token) => Arc::new(StaticToken::new(token)),
        }
    }
}

/// Credentials plus a description of where they came from.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub credentials: Credentials,
    pub source: String,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct CredentialResolver {
    explicit: Option<PathBuf>,
    home: Option<PathBuf>,
    working_dir: PathBuf,
    lookup: EnvLookup,
}

impl CredentialResolver {
    /// Resolver over the process environment, `$HOME` and the current directory.
    pub fn from_env(explicit: Option<PathBuf>) -> Self {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::new(|key| std::env::var(key).ok())
            .explicit_path(explicit)
            .home_dir(home)
    }

    pub fn new<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            explicit: None,
            home: None,
            working_dir: PathBuf::from("."),
            lookup: Box::new(lookup),
        }
    }

    pub fn explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn home_dir(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    pub async fn resolve(&self) -> Result<ResolvedCredentials, AuthError> {
        let mut searched = Vec::new();

        if let Some(path) = &self.explicit {
            let source = format!("--credentials {}", path.display());
            if let Some(found) = read_candidate(path, &source, true).await? {
                return Ok(found);
            }
            searched.push(source);
        }

        let inline = "$GOOGLE_SERVICE_ACCOUNT_JSON".to_string();
        if let Some(json) = self.var("GOOGLE_SERVICE_ACCOUNT_JSON") {
            if let Some(found) = parse_candidate(&json, &inline)? {
                return Ok(found);
            }
        }
        searched.push(inline);

        for variable in PATH_VARIABLES {
            match self.var(variable) {
                Some(path) => {
                    let source = format!("${} ({})", variable, path);
                    if let Some(found) = read_candidate(Path::new(&path), &source, true).await? {
                        return Ok(found);
                    }
                    searched.push(source);
                }
                None => searched.push(format!("${}", variable)),
            }
        }

        let mut default_paths = Vec::new();
        if let Some(home) = &self.home {
            default_paths.push(home.join(CREDENTIALS_FILE));
        }
        default_paths.push(self.working_dir.join(CREDENTIALS_FILE));
        for path in default_paths {
            let source = path.display().to_string();
            if let Some(found) = read_candidate(&path, &source, false).await? {
                return Ok(found);
            }
            searched.push(source);
        }

        let token_source = "$GOOGLE_OAUTH_ACCESS_TOKEN".to_string();
        if let Some(token) = self.var("GOOGLE_OAUTH_ACCESS_TOKEN") {
            tracing::info!("Using credentials found in {}", token_source);
            return Ok(ResolvedCredentials {
                credentials: Credentials::AccessToken(token.trim().to_string()),
                source: token_source,
            });
        }
        searched.push(token_source);

        tracing::error!(
            "Unable to find Google credentials. Expected credential locations: {}",
            searched.join(", ")
        );
        Err(AuthError::NoCredentials { searched })
    }
}

/// `Ok(None)` means skip this candidate and keep searching.
async fn read_candidate(
    path: &Path,
    source: &str,
    named: bool,
) -> Result<Option<ResolvedCredentials>, AuthError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_candidate(&content, source),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !named => {
            tracing::debug!("No credentials at {}", source);
            Ok(None)
        }
        Err(e) => {
            tracing::warn!("Skipping credentials at {}: {}", source, e);
            Ok(None)
        }
    }
}

fn parse_candidate(content: &str, source: &str) -> Result<Option<ResolvedCredentials>, AuthError> {
    match Credentials::from_json(content) {
        Ok(credentials) => {
            tracing::info!(
                "Using credentials found in {} ({})",
                source,
                credentials.kind()
            );
            Ok(Some(ResolvedCredentials {
                credentials,
                source: source.to_string(),
            }))
        }
        Err(err @ AuthError::UnsupportedCredentialType(_)) => Err(err),
        Err(e) => {
            tracing::warn!("Skipping credentials at {}: {}", source, e);
            Ok(None)
        }
    }
}
