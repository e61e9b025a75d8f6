// The Drive file object model.
//
// Every handle (folder, spreadsheet, document, presentation, plain file)
// wraps a `DriveFile` plus the services it needs. The Drive-level
// capabilities are provided once here; specialized handles add their own
// API on top.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::drive_models::{CopyOptions, DriveFile, MimeType, Permission, ShareOptions};
use super::drive_service::DriveService;
use super::export::ExportTarget;
use crate::core::error::{GoogleError, Result};
use crate::core::transport::GoogleTransport;

#[async_trait]
pub trait DriveItem: Send + Sync {
    type Transport: GoogleTransport + 'static;

    fn file(&self) -> &DriveFile;
    fn file_mut(&mut self) -> &mut DriveFile;
    fn drive(&self) -> &DriveService<Self::Transport>;

    fn id(&self) -> &str {
        &self.file().id
    }

    fn name(&self) -> &str {
        &self.file().name
    }

    fn mime_type(&self) -> &MimeType {
        &self.file().mime_type
    }

    fn url(&self) -> String {
        self.file().url()
    }

    /// Re-reads the Drive metadata (name, parents, permissions).
    async fn reload_metadata(&mut self) -> Result<()> {
        let file = self.drive().get(self.id()).await?;
        *self.file_mut() = file;
        Ok(())
    }

    async fn rename(&mut self, new_name: &str) -> Result<()> {
        let drive = self.drive().clone();
        drive.rename(self.file_mut(), new_name).await
    }

    async fn move_to(&mut self, folder_id: &str) -> Result<()> {
        let drive = self.drive().clone();
        drive.move_to(self.file_mut(), folder_id).await
    }

    async fn delete(&self) -> Result<()> {
        self.drive().delete(self.id()).await
    }

    async fn copy(&self, new_name: Option<&str>, options: CopyOptions) -> Result<DriveFile> {
        self.drive().copy(self.file(), new_name, options).await
    }

    async fn share(&mut self, permission: &Permission, options: ShareOptions) -> Result<Permission> {
        let drive = self.drive().clone();
        drive.share(self.file_mut(), permission, options).await
    }

    /// Replays this file's permissions on `target`.
    async fn copy_permissions_to(&self, target: &mut DriveFile, options: ShareOptions) -> Result<usize> {
        self.drive().copy_permissions(self.file(), target, options).await
    }

    async fn export(
        &self,
        destination_folder: &Path,
        target: &ExportTarget,
        open_file: bool,
    ) -> Result<PathBuf> {
        self.drive()
            .export(self.file(), destination_folder, target, open_file)
            .await
    }

    async fn download(
        &self,
        destination_folder: &Path,
        file_name: Option<&str>,
        open_file: bool,
    ) -> Result<PathBuf> {
        self.drive()
            .download(self.file(), destination_folder, file_name, open_file)
            .await
    }

    fn open_in_browser(&self) -> Result<()> {
        self.drive().open_in_browser(self.file())
    }
}

pub fn ensure_mime(file: &DriveFile, expected: &MimeType) -> Result<()> {
    if &file.mime_type == expected {
        Ok(())
    } else {
        Err(GoogleError::WrongMimeType {
            expected: expected.to_string(),
            actual: file.mime_type.to_string(),
        })
    }
}

/// A Drive folder.
pub struct Folder<T: GoogleTransport> {
    file: DriveFile,
    drive: DriveService<T>,
}

impl<T: GoogleTransport + 'static> Folder<T> {
    pub fn from_file(drive: DriveService<T>, file: DriveFile) -> Result<Self> {
        ensure_mime(&file, &MimeType::Folder)?;
        Ok(Self { file, drive })
    }

    pub async fn open(drive: DriveService<T>, folder_id: &str) -> Result<Self> {
        let file = drive.get(folder_id).await?;
        Self::from_file(drive, file)
    }

    pub async fn create(
        drive: DriveService<T>,
        name: &str,
        parent: Option<&str>,
        transfer_permissions: Option<ShareOptions>,
    ) -> Result<Self> {
        let file = drive
            .create(name, &MimeType::Folder, parent, transfer_permissions)
            .await?;
        Self::from_file(drive, file)
    }

    /// Every non-trashed item directly inside this folder.
    pub async fn children(&self) -> Result<Vec<DriveFile>> {
        let query = format!(
            "'{}' in parents and trashed=false",
            super::drive_service::escape_query_value(&self.file.id)
        );
        self.drive.list(&query, self.file.drive_id.as_deref()).await
    }

    pub async fn subfolders(&self) -> Result<Vec<DriveFile>> {
        self.drive
            .list_folders_in(&self.file.id, self.file.drive_id.as_deref())
            .await
    }

    pub async fn create_subfolder(&self, name: &str) -> Result<Folder<T>> {
        Folder::create(self.drive.clone(), name, Some(&self.file.id), None).await
    }
}

#[async_trait]
impl<T: GoogleTransport + 'static> DriveItem for Folder<T> {
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

/// Any Drive file without a specialized handle (PDFs, images, drawings...).
pub struct GenericFile<T: GoogleTransport> {
    file: DriveFile,
    drive: DriveService<T>,
}

impl<T: GoogleTransport + 'static> GenericFile<T> {
    pub fn new(drive: DriveService<T>, file: DriveFile) -> Self {
        Self { file, drive }
    }
}

#[async_trait]
impl<T: GoogleTransport + 'static> DriveItem for GenericFile<T> {
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

    fn drive() -> (Arc<InMemoryTransport>, DriveService<InMemoryTransport>) {
        let transport = Arc::new(InMemoryTransport::new());
        (Arc::clone(&transport), DriveService::new(transport))
    }

    #[tokio::test]
    async fn opening_a_folder_checks_the_mime_type() {
        let (transport, drive) = drive();
        transport.push_json(json!({ "id": "x", "mimeType": "application/pdf" }));

        let err = Folder::open(drive, "x").await.err().unwrap();
        assert!(matches!(err, GoogleError::WrongMimeType { .. }));
    }

    #[tokio::test]
    async fn rename_through_the_trait_updates_local_state() {
        let (transport, drive) = drive();
        let file: DriveFile = serde_json::from_value(json!({ "id": "f", "name": "old" })).unwrap();
        let mut item = GenericFile::new(drive, file);
        transport.push_json(json!({ "id": "f", "name": "new" }));

        item.rename("new").await.unwrap();

        assert_eq!(item.name(), "new");
        assert_eq!(transport.requests()[0].json_body().unwrap()["name"], "new");
    }

    #[tokio::test]
    async fn folder_children_query_uses_parent_id() {
        let (transport, drive) = drive();
        let file: DriveFile = serde_json::from_value(json!({
            "id": "folder-1",
            "mimeType": "application/vnd.google-apps.folder"
        }))
        .unwrap();
        let folder = Folder::from_file(drive, file).unwrap();
        transport.push_json(json!({ "files": [{ "id": "a" }, { "id": "b" }] }));

        let children = folder.children().await.unwrap();

        assert_eq!(children.len(), 2);
        assert_eq!(
            transport.requests()[0].query_value("q"),
            Some("'folder-1' in parents and trashed=false")
        );
    }
}
