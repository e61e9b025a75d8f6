// Entry point bundling every service over one shared transport, plus
// MIME-type dispatch from a Drive file id to the matching handle.

use std::sync::Arc;

use crate::core::docs::{DocsService, Document};
use crate::core::drive::{DriveFile, DriveItem, DriveService, Folder, GenericFile, MimeType};
use crate::core::error::Result;
use crate::core::sheets::{SheetsService, Spreadsheet};
use crate::core::slides::{Presentation, SlidesService};
use crate::core::storage::StorageService;
use crate::core::tasks::TasksService;
use crate::core::transport::GoogleTransport;

pub struct Workspace<T: GoogleTransport> {
    pub drive: DriveService<T>,
    pub sheets: SheetsService<T>,
    pub slides: SlidesService<T>,
    pub docs: DocsService<T>,
    pub tasks: TasksService<T>,
    pub storage: StorageService<T>,
}

impl<T: GoogleTransport> Clone for Workspace<T> {
    fn clone(&self) -> Self {
        Self {
            drive: self.drive.clone(),
            sheets: self.sheets.clone(),
            slides: self.slides.clone(),
            docs: self.docs.clone(),
            tasks: self.tasks.clone(),
            storage: self.storage.clone(),
        }
    }
}

impl<T: GoogleTransport + 'static> Workspace<T> {
    pub fn new(transport: T) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    pub fn from_arc(transport: Arc<T>) -> Self {
        Self {
            drive: DriveService::new(Arc::clone(&transport)),
            sheets: SheetsService::new(Arc::clone(&transport)),
            slides: SlidesService::new(Arc::clone(&transport)),
            docs: DocsService::new(Arc::clone(&transport)),
            tasks: TasksService::new(Arc::clone(&transport)),
            storage: StorageService::new(transport),
        }
    }

    /// Reads the file's metadata once and wraps it in the matching handle.
    pub async fn open(&self, file_id: &str) -> Result<WorkspaceFile<T>> {
        let file = self.drive.get(file_id).await?;
        self.wrap(file)
    }

    pub fn wrap(&self, file: DriveFile) -> Result<WorkspaceFile<T>> {
        let mime_type = file.mime_type.clone();
        let handle = match mime_type {
            MimeType::Folder => WorkspaceFile::Folder(Folder::from_file(self.drive.clone(), file)?),
            MimeType::Spreadsheet => WorkspaceFile::Spreadsheet(Spreadsheet::from_file(
                self.drive.clone(),
                self.sheets.clone(),
                file,
            )?),
            MimeType::Document => WorkspaceFile::Document(Document::from_file(
                self.drive.clone(),
                self.docs.clone(),
                file,
            )?),
            MimeType::Presentation => WorkspaceFile::Presentation(Presentation::from_file(
                self.drive.clone(),
                self.slides.clone(),
                file,
            )?),
            _ => WorkspaceFile::Other(GenericFile::new(self.drive.clone(), file)),
        };
        tracing::debug!("Opened {} as {}", handle.file().id, handle.kind());
        Ok(handle)
    }

    pub async fn open_folder(&self, id: &str) -> Result<Folder<T>> {
        Folder::open(self.drive.clone(), id).await
    }

    pub async fn open_spreadsheet(&self, id: &str) -> Result<Spreadsheet<T>> {
        Spreadsheet::open(self.drive.clone(), self.sheets.clone(), id).await
    }

    pub async fn open_document(&self, id: &str) -> Result<Document<T>> {
        Document::open(self.drive.clone(), self.docs.clone(), id).await
    }

    pub async fn open_presentation(&self, id: &str) -> Result<Presentation<T>> {
        Presentation::open(self.drive.clone(), self.slides.clone(), id).await
    }
}

/// A Drive file wrapped in the handle its MIME type calls for.
pub enum WorkspaceFile<T: GoogleTransport + 'static> {
    Folder(Folder<T>),
    Spreadsheet(Spreadsheet<T>),
    Document(Document<T>),
    Presentation(Presentation<T>),
    Other(GenericFile<T>),
}

impl<T: GoogleTransport + 'static> WorkspaceFile<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkspaceFile::Folder(_) => "folder",
            WorkspaceFile::Spreadsheet(_) => "spreadsheet",
            WorkspaceFile::Document(_) => "document",
            WorkspaceFile::Presentation(_) => "presentation",
            WorkspaceFile::Other(_) => "file",
        }
    }

    pub fn item(&self) -> &dyn DriveItem<Transport = T> {
        match self {
            WorkspaceFile::Folder(f) => f,
            WorkspaceFile::Spreadsheet(f) => f,
            WorkspaceFile::Document(f) => f,
            WorkspaceFile::Presentation(f) => f,
            WorkspaceFile::Other(f) => f,
        }
    }

    pub fn item_mut(&mut self) -> &mut dyn DriveItem<Transport = T> {
        match self {
            WorkspaceFile::Folder(f) => f,
            WorkspaceFile::Spreadsheet(f) => f,
            WorkspaceFile::Document(f) => f,
            WorkspaceFile::Presentation(f) => f,
            WorkspaceFile::Other(f) => f,
        }
    }

    pub fn file(&self) -> &DriveFile {
        self.item().file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::transport::InMemoryTransport;
    use serde_json::json;

    #[tokio::test]
    async fn open_dispatches_on_mime_type() {
        let transport = Arc::new(InMemoryTransport::new());
        let workspace = Workspace::from_arc(Arc::clone(&transport));
        let cases = [
            ("application/vnd.google-apps.folder", "folder"),
            ("application/vnd.google-apps.spreadsheet", "spreadsheet"),
            ("application/vnd.google-apps.document", "document"),
            ("application/vnd.google-apps.presentation", "presentation"),
            ("image/png", "file"),
        ];

        for (mime, kind) in cases {
            transport.push_json(json!({ "id": "f1", "name": "x", "mimeType": mime }));
            let handle = workspace.open("f1").await.unwrap();
            assert_eq!(handle.kind(), kind);
            assert_eq!(handle.item().id(), "f1");
        }
        assert_eq!(transport.requests().len(), 5);
    }

    #[tokio::test]
    async fn typed_open_rejects_other_files() {
        let transport = Arc::new(InMemoryTransport::new());
        let workspace = Workspace::from_arc(Arc::clone(&transport));
        transport.push_json(json!({ "id": "f1", "mimeType": "application/vnd.google-apps.document" }));

        assert!(workspace.open_presentation("f1").await.is_err());
    }

    #[tokio::test]
    async fn rename_through_the_dispatched_handle() {
        let transport = Arc::new(InMemoryTransport::new());
        let workspace = Workspace::from_arc(Arc::clone(&transport));
        transport.push_json(json!({ "id": "f1", "name": "a", "mimeType": "application/pdf" }));
        transport.push_json(json!({ "id": "f1", "name": "b", "mimeType": "application/pdf" }));

        let mut handle = workspace.open("f1").await.unwrap();
        handle.item_mut().rename("b").await.unwrap();

        assert_eq!(handle.file().name, "b");
    }
}
