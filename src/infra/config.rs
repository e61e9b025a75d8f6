// Environment-driven settings. `.env` is loaded by the binary before this runs.

use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Whole-request timeout for API calls.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// User to impersonate through domain-wide delegation (service accounts only).
    pub impersonate_subject: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            impersonate_subject: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injected variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = match lookup("GOOGLE_API_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(
                        "Ignoring GOOGLE_API_TIMEOUT_SECS={:?}, using {}s",
                        raw,
                        DEFAULT_TIMEOUT_SECS
                    );
                    DEFAULT_TIMEOUT_SECS
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let impersonate_subject = lookup("GOOGLE_IMPERSONATE_SUBJECT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            timeout: Duration::from_secs(timeout_secs),
            impersonate_subject,
            ..Self::default()
        }
    }
}
