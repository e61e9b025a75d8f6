use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use super::docs_models::DocumentInfo;
use super::docs_service::DocsService;
use super::docs_text::{body_runs, tabs_text};
use crate::core::drive::{ensure_mime, DriveFile, DriveItem, DriveService, MimeType, ShareOptions};
use crate::core::error::{GoogleError, Result};
use crate::core::transport::GoogleTransport;

/// A Google Docs file with lazily fetched document content.
pub struct Document<T: GoogleTransport> {
    file: DriveFile,
    drive: DriveService<T>,
    docs: DocsService<T>,
    info: Option<DocumentInfo>,
}

impl<T: GoogleTransport + 'static> Document<T> {
    pub fn from_file(drive: DriveService<T>, docs: DocsService<T>, file: DriveFile) -> Result<Self> {
        ensure_mime(&file, &MimeType::Document)?;
        Ok(Self {
            file,
            drive,
            docs,
            info: None,
        })
    }

    pub async fn open(drive: DriveService<T>, docs: DocsService<T>, id: &str) -> Result<Self> {
        let file = drive.get(id).await?;
        Self::from_file(drive, docs, file)
    }

    pub async fn create(
        drive: DriveService<T>,
        docs: DocsService<T>,
        name: &str,
        parent: Option<&str>,
        transfer_permissions: Option<ShareOptions>,
    ) -> Result<Self> {
        let file = drive
            .create(name, &MimeType::Document, parent, transfer_permissions)
            .await?;
        Self::from_file(drive, docs, file)
    }

    pub async fn info(&mut self) -> Result<&DocumentInfo> {
        if self.info.is_none() {
            let info = self.docs.get(&self.file.id).await?;
            self.info = Some(info);
        }
        self.info
            .as_ref()
            .ok_or_else(|| GoogleError::NotFound(format!("Document {}", self.file.id)))
    }

    pub async fn refresh(&mut self) -> Result<&DocumentInfo> {
        self.info = None;
        self.info().await
    }

    pub async fn document_style(&mut self) -> Result<Option<Value>> {
        Ok(self.info().await?.document_style.clone())
    }

    /// Named styles keyed by style type (`NORMAL_TEXT`, `HEADING_1`...).
    pub async fn named_styles(&mut self) -> Result<BTreeMap<String, serde_json::Map<String, Value>>> {
        Ok(self
            .info()
            .await?
            .named_styles
            .iter()
            .flat_map(|styles| styles.styles.iter())
            .map(|style| (style.named_style_type.clone(), style.properties.clone()))
            .collect())
    }

    pub async fn body_text(&mut self) -> Result<Vec<String>> {
        Ok(self
            .info()
            .await?
            .body
            .as_ref()
            .map(body_runs)
            .unwrap_or_default())
    }

    /// Text of every tab, titled by tab and nested by depth. Always fetched
    /// fresh since tab content is not part of the cached info.
    pub async fn all_tabs_text(&self) -> Result<String> {
        let document = self.docs.get_with_tabs(&self.file.id).await?;

        let mut combined = format!("# {}\n\n", document.title);
        if document.tabs.is_empty() {
            combined.push_str("(No tabs found in document)\n");
        } else {
            tabs_text(&document.tabs, &mut combined, 0);
        }

        tracing::info!(
            "Fetched Google Doc '{}' with {} top-level tab(s): {} chars",
            document.title,
            document.tabs.len(),
            combined.len()
        );
        Ok(combined)
    }

    /// Applies the requests and reloads the document.
    pub async fn batch_update(&mut self, requests: &[Value]) -> Result<Value> {
        let response = self.docs.batch_update(&self.file.id, requests).await?;
        self.refresh().await?;
        Ok(response)
    }
}

#[async_trait]
impl<T: GoogleTransport + 'static> DriveItem for Document<T> {
    type Transport = T;

    fn file(&self) -> &DriveFile {
        &self.file
    }

    fn file_mut(&mut self) -> &mut DriveFile {
        &mut self.file
    }

    fn drive(&self) -> &DriveService<T> {
        &self.drive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::transport::InMemoryTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn handle(transport: &Arc<InMemoryTransport>) -> Document<InMemoryTransport> {
        let file: DriveFile = serde_json::from_value(json!({
            "id": "d1",
            "name": "Notes",
            "mimeType": "application/vnd.google-apps.document"
        }))
        .unwrap();
        Document::from_file(
            DriveService::new(Arc::clone(transport)),
            DocsService::new(Arc::clone(transport)),
            file,
        )
        .unwrap()
    }

    fn info_json() -> Value {
        json!({
            "documentId": "d1",
            "title": "Notes",
            "body": { "content": [
                { "sectionBreak": {} },
                { "paragraph": { "elements": [
                    { "textRun": { "content": "Hello " } },
                    { "textRun": { "content": "world\n" } }
                ]}}
            ]},
            "namedStyles": { "styles": [
                { "namedStyleType": "NORMAL_TEXT", "textStyle": { "bold": false } },
                { "namedStyleType": "TITLE", "textStyle": { "bold": true } }
            ]}
        })
    }

    #[tokio::test]
    async fn body_and_styles_come_from_one_fetch() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut doc = handle(&transport);
        transport.push_json(info_json());

        assert_eq!(doc.body_text().await.unwrap(), vec!["Hello ", "world\n"]);
        let styles = doc.named_styles().await.unwrap();
        assert_eq!(styles["TITLE"]["textStyle"]["bold"], true);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn batch_update_targets_the_document_and_refetches() {
        let transport = Arc::new(InMemoryTransport::new());
        let mut doc = handle(&transport);
        transport.push_json(json!({ "replies": [{}] }));
        transport.push_json(info_json());

        doc.batch_update(&[json!({ "insertText": { "location": { "index": 1 }, "text": "Hi" } })])
            .await
            .unwrap();

        let requests = transport.requests();
        assert!(requests[0].url.ends_with("documents/d1:batchUpdate"));
        assert!(requests[1].url.ends_with("documents/d1"));
    }

    #[tokio::test]
    async fn documents_without_tabs_say_so() {
        let transport = Arc::new(InMemoryTransport::new());
        let doc = handle(&transport);
        transport.push_json(json!({ "documentId": "d1", "title": "Empty" }));

        let text = doc.all_tabs_text().await.unwrap();

        assert_eq!(text, "# Empty\n\n(No tabs found in document)\n");
        assert_eq!(transport.requests()[0].query_value("includeTabsContent"), Some("true"));
    }
}
