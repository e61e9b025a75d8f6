use std::sync::Arc;

use serde_json::{json, Value};

use super::docs_models::DocumentInfo;
use crate::core::api::GoogleApi;
use crate::core::error::Result;
use crate::core::transport::{ApiRequest, GoogleTransport};

/// Thin wrapper over the Docs v1 REST API.
pub struct DocsService<T: GoogleTransport> {
    transport: Arc<T>,
}

impl<T: GoogleTransport> Clone for DocsService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: GoogleTransport> DocsService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub async fn get(&self, document_id: &str) -> Result<DocumentInfo> {
        let request = ApiRequest::get(GoogleApi::Docs, &format!("documents/{}", document_id));
        let value = self.transport.send_json(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetches the document with the content of every tab.
    pub async fn get_with_tabs(&self, document_id: &str) -> Result<DocumentInfo> {
        let request = ApiRequest::get(GoogleApi::Docs, &format!("documents/{}", document_id))
            .query("includeTabsContent", true);
        tracing::debug!("Fetching Google Doc with all tabs: {}", document_id);
        let value = self.transport.send_json(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create(&self, title: &str) -> Result<DocumentInfo> {
        let request =
            ApiRequest::post(GoogleApi::Docs, "documents").json(json!({ "title": title }));
        let value = self.transport.send_json(request).await?;
        let info: DocumentInfo = serde_json::from_value(value)?;
        tracing::info!("Created document '{}' ({})", title, info.document_id);
        Ok(info)
    }

    /// Requests are passed through as JSON; Docs requests are not modelled.
    pub async fn batch_update(&self, document_id: &str, requests: &[Value]) -> Result<Value> {
        let request = ApiRequest::post(
            GoogleApi::Docs,
            &format!("documents/{}:batchUpdate", document_id),
        )
        .json(json!({ "requests": requests }));
        self.transport.send_json(request).await
    }
}
