// The transport is the only seam between the services and the network.
// Services build `ApiRequest`s, the infra layer decides how they get sent
// (authenticated reqwest client in production, queued fakes in tests).

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::api::GoogleApi;
use super::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Raw { content_type: String, bytes: Vec<u8> },
}

/// A fully described call to a Google REST endpoint.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// OAuth scopes the access token must carry.
    pub scopes: Vec<String>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, api: GoogleApi, path: &str) -> Self {
        Self::with_base(method, api, api.base_url(), path)
    }

    pub fn get(api: GoogleApi, path: &str) -> Self {
        Self::new(HttpMethod::Get, api, path)
    }

    pub fn post(api: GoogleApi, path: &str) -> Self {
        Self::new(HttpMethod::Post, api, path)
    }

    pub fn put(api: GoogleApi, path: &str) -> Self {
        Self::new(HttpMethod::Put, api, path)
    }

    pub fn patch(api: GoogleApi, path: &str) -> Self {
        Self::new(HttpMethod::Patch, api, path)
    }

    pub fn delete(api: GoogleApi, path: &str) -> Self {
        Self::new(HttpMethod::Delete, api, path)
    }

    /// POST against the API's media upload endpoint.
    pub fn upload(api: GoogleApi, path: &str) -> Self {
        let base = api.upload_url().unwrap_or_else(|| api.base_url());
        Self::with_base(HttpMethod::Post, api, base, path)
    }

    fn with_base(method: HttpMethod, api: GoogleApi, base: &str, path: &str) -> Self {
        let path = path.trim_start_matches('/');
        let url = if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        };

        Self {
            method,
            url,
            query: Vec::new(),
            body: RequestBody::Empty,
            scopes: vec![api.scope().to_string()],
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds the pair only when a value is present.
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Replaces any existing value for `key`.
    pub fn set_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.retain(|(k, _)| k != key);
        self.query(key, value)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn raw(mut self, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.body = RequestBody::Raw {
            content_type: content_type.into(),
            bytes,
        };
        self
    }

    /// Requests the scope of another API on top of the primary one.
    pub fn with_api(mut self, api: GoogleApi) -> Self {
        let scope = api.scope().to_string();
        if !self.scopes.contains(&scope) {
            self.scopes.push(scope);
        }
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Sends requests to Google and hands back the decoded response.
#[async_trait]
pub trait GoogleTransport: Send + Sync {
    /// Sends the request and parses the JSON response. Empty successful bodies become `{}`.
    async fn send_json(&self, request: ApiRequest) -> Result<Value>;

    /// Sends the request and returns the raw body (media downloads and exports).
    async fn send_bytes(&self, request: ApiRequest) -> Result<Vec<u8>>;
}

/// Follows `nextPageToken` until every page of `items_field` has been collected.
pub async fn collect_pages<T>(
    transport: &T,
    request: ApiRequest,
    items_field: &str,
    limit: Option<usize>,
) -> Result<Vec<Value>>
where
    T: GoogleTransport + ?Sized,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    let limit = limit.unwrap_or(usize::MAX);

    loop {
        let mut page_request = request.clone();
        if let Some(token) = &page_token {
            page_request = page_request.set_query("pageToken", token);
        }

        let response = transport.send_json(page_request).await?;

        if let Some(page) = response.get(items_field).and_then(|v| v.as_array()) {
            items.extend(page.iter().cloned());
            if items.len() >= limit {
                items.truncate(limit);
                break;
            }
        }

        match response.get("nextPageToken").and_then(|v| v.as_str()) {
            Some(next) if !next.is_empty() => page_token = Some(next.to_string()),
            _ => break,
        }
    }

    tracing::debug!("Collected {} {} across pages", items.len(), items_field);
    Ok(items)
}
