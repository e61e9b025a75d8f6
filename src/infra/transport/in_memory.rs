// In-memory implementation of GoogleTransport.
//
// Responses are queued up front and handed out in order, and every request
// is recorded so tests can assert on what the services actually sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::error::{GoogleError, Result};
use crate::core::transport::{ApiRequest, GoogleTransport};

#[derive(Debug, Clone)]
enum QueuedResponse {
    Json(Value),
    Bytes(Vec<u8>),
    Error { status: u16, message: String },
}

#[derive(Default)]
pub struct InMemoryTransport {
    responses: Mutex<VecDeque<QueuedResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, value: Value) {
        self.push(QueuedResponse::Json(value));
    }

    pub fn push_bytes(&self, bytes: impl Into<Vec<u8>>) {
        self.push(QueuedResponse::Bytes(bytes.into()));
    }

    /// Queues a Google error envelope answered with `status`.
    pub fn push_error(&self, status: u16, message: &str) {
        self.push(QueuedResponse::Error {
            status,
            message: message.to_string(),
        });
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn pending(&self) -> usize {
        match self.responses.lock() {
            Ok(responses) => responses.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn push(&self, response: QueuedResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }

    fn next(&self, request: ApiRequest) -> Result<QueuedResponse> {
        tracing::debug!("In-memory {}", request);
        let description = request.to_string();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let next = self
            .responses
            .lock()
            .map_err(|_| GoogleError::Http("response queue poisoned".into()))?
            .pop_front();

        next.ok_or_else(|| GoogleError::Http(format!("no response queued for {}", description)))
    }
}

fn queued_error(status: u16, message: String) -> GoogleError {
    if status == 429 {
        GoogleError::RateLimited
    } else {
        GoogleError::Api { status, message }
    }
}

#[async_trait]
impl GoogleTransport for InMemoryTransport {
    async fn send_json(&self, request: ApiRequest) -> Result<Value> {
        match self.next(request)? {
            QueuedResponse::Json(value) => Ok(value),
            QueuedResponse::Bytes(bytes) if bytes.is_empty() => {
                Ok(Value::Object(serde_json::Map::new()))
            }
            QueuedResponse::Bytes(bytes) => Ok(serde_json::from_slice(&bytes)?),
            QueuedResponse::Error { status, message } => Err(queued_error(status, message)),
        }
    }

    async fn send_bytes(&self, request: ApiRequest) -> Result<Vec<u8>> {
        match self.next(request)? {
            QueuedResponse::Bytes(bytes) => Ok(bytes),
            QueuedResponse::Json(value) => Ok(serde_json::to_vec(&value)?),
            QueuedResponse::Error { status, message } => Err(queued_error(status, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::GoogleApi;
    use serde_json::json;

    #[tokio::test]
    async fn responses_come_back_in_order() {
        let transport = InMemoryTransport::new();
        transport.push_json(json!({ "n": 1 }));
        transport.push_bytes(b"raw".to_vec());

        let first = transport
            .send_json(ApiRequest::get(GoogleApi::Drive, "files/a"))
            .await
            .unwrap();
        let second = transport
            .send_bytes(ApiRequest::get(GoogleApi::Drive, "files/b"))
            .await
            .unwrap();

        assert_eq!(first, json!({ "n": 1 }));
        assert_eq!(second, b"raw");
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.pending(), 0);
    }

    #[tokio::test]
    async fn queued_errors_surface_as_api_errors() {
        let transport = InMemoryTransport::new();
        transport.push_error(404, "File not found");
        transport.push_error(429, "slow down");

        let err = transport
            .send_json(ApiRequest::get(GoogleApi::Drive, "files/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleError::Api { status: 404, .. }));

        let err = transport
            .send_json(ApiRequest::get(GoogleApi::Drive, "files/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleError::RateLimited));
    }

    #[tokio::test]
    async fn an_empty_queue_is_an_error() {
        let transport = InMemoryTransport::new();
        let err = transport
            .send_json(ApiRequest::get(GoogleApi::Tasks, "users/@me/lists"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no response queued"));
    }
}
