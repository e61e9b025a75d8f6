use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};

use super::drive_models::{CopyOptions, DriveFile, MimeType, Permission, Role, ShareOptions};
use super::export::{ExportFormats, ExportTarget};
use crate::core::api::GoogleApi;
use crate::core::error::{GoogleError, Result};
use crate::core::transport::{collect_pages, ApiRequest, GoogleTransport};

const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,parents,webViewLink,webContentLink,driveId)";
const UPLOAD_BOUNDARY: &str = "gworkspace_upload_boundary";

/// Drive operations shared by every kind of file.
pub struct DriveService<T: GoogleTransport> {
    transport: Arc<T>,
}

impl<T: GoogleTransport> Clone for DriveService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: GoogleTransport> DriveService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    async fn send_file(&self, request: ApiRequest) -> Result<DriveFile> {
        let value = self.transport.send_json(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Full metadata of a file, permissions included.
    pub async fn get(&self, file_id: &str) -> Result<DriveFile> {
        let request = ApiRequest::get(GoogleApi::Drive, &format!("files/{}", file_id))
            .query("fields", "*")
            .query("supportsAllDrives", true);
        self.send_file(request).await
    }

    pub async fn get_name(&self, file_id: &str) -> Result<String> {
        let request = ApiRequest::get(GoogleApi::Drive, &format!("files/{}", file_id))
            .query("fields", "name")
            .query("supportsAllDrives", true);
        let value = self.transport.send_json(request).await?;
        value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GoogleError::Decode(format!("File {} has no name", file_id)))
    }

    /// Creates an empty file of the given type, optionally inside `parent`.
    ///
    /// With `transfer_permissions` the parent folder's permissions are
    /// replayed on the new file.
    pub async fn create(
        &self,
        name: &str,
        mime_type: &MimeType,
        parent: Option<&str>,
        transfer_permissions: Option<ShareOptions>,
    ) -> Result<DriveFile> {
        let mut body = json!({ "name": name, "mimeType": mime_type.as_str() });
        if let Some(parent) = parent {
            body["parents"] = json!([parent]);
        }

        let request = ApiRequest::post(GoogleApi::Drive, "files")
            .query("fields", "*")
            .query("supportsAllDrives", true)
            .json(body);
        let mut file = self.send_file(request).await?;
        tracing::info!("Created {} '{}' ({})", mime_type, file.name, file.id);

        if let (Some(parent), Some(options)) = (parent, transfer_permissions) {
            let parent = self.get(parent).await?;
            self.copy_permissions(&parent, &mut file, options).await?;
        }

        Ok(file)
    }

    pub async fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<DriveFile> {
        self.create(name, &MimeType::Folder, parent, None).await
    }

    /// Copies a file. Without a name the copy keeps the original's name.
    pub async fn copy(
        &self,
        file: &DriveFile,
        new_name: Option<&str>,
        options: CopyOptions,
    ) -> Result<DriveFile> {
        let mut body = json!({ "name": new_name.unwrap_or(&file.name) });
        if let Some(parent) = options.parent.as_deref().or(file.parent_folder_id()) {
            body["parents"] = json!([parent]);
        }

        let request = ApiRequest::post(GoogleApi::Drive, &format!("files/{}/copy", file.id))
            .query("fields", "*")
            .query("supportsAllDrives", options.supports_all_drives)
            .json(body);
        let mut copy = self.send_file(request).await?;
        tracing::info!("Copied '{}' ({}) to '{}' ({})", file.name, file.id, copy.name, copy.id);

        if let Some(share) = options.transfer_permissions {
            self.copy_permissions(file, &mut copy, share).await?;
        }

        Ok(copy)
    }

    pub async fn copy_by_id(&self, file_id: &str, new_name: Option<&str>) -> Result<DriveFile> {
        let file = self.get(file_id).await?;
        self.copy(&file, new_name, CopyOptions::default()).await
    }

    /// Moves a file into `folder_id`, detaching it from every current parent.
    pub async fn move_to(&self, file: &mut DriveFile, folder_id: &str) -> Result<()> {
        let previous = if file.parents.is_empty() {
            self.get(&file.id).await?.parents
        } else {
            file.parents.clone()
        };

        let request = ApiRequest::patch(GoogleApi::Drive, &format!("files/{}", file.id))
            .query("addParents", folder_id)
            .query("removeParents", previous.join(","))
            .query("fields", "id,parents")
            .query("supportsAllDrives", true)
            .json(json!({}));
        let response = self.transport.send_json(request).await?;

        file.parents = match response.get("parents").and_then(Value::as_array) {
            Some(parents) => parents
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            None => vec![folder_id.to_string()],
        };
        tracing::info!("Moved '{}' ({}) into folder {}", file.name, file.id, folder_id);
        Ok(())
    }

    pub async fn rename(&self, file: &mut DriveFile, new_name: &str) -> Result<()> {
        let request = ApiRequest::patch(GoogleApi::Drive, &format!("files/{}", file.id))
            .query("fields", "id,name")
            .query("supportsAllDrives", true)
            .json(json!({ "name": new_name }));
        self.transport.send_json(request).await?;

        tracing::info!("Renamed '{}' ({}) to '{}'", file.name, file.id, new_name);
        file.name = new_name.to_string();
        Ok(())
    }

    pub async fn delete(&self, file_id: &str) -> Result<()> {
        let request = ApiRequest::delete(GoogleApi::Drive, &format!("files/{}", file_id))
            .query("supportsAllDrives", true);
        self.transport.send_json(request).await?;
        tracing::info!("Deleted file {}", file_id);
        Ok(())
    }

    pub async fn list_permissions(&self, file_id: &str) -> Result<Vec<Permission>> {
        let request = ApiRequest::get(GoogleApi::Drive, &format!("files/{}/permissions", file_id))
            .query("fields", "nextPageToken,permissions(*)")
            .query("supportsAllDrives", true);
        let items = collect_pages(self.transport.as_ref(), request, "permissions", None).await?;
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(GoogleError::from))
            .collect()
    }

    /// Grants a permission and records it in the file's local permission list.
    pub async fn share(
        &self,
        file: &mut DriveFile,
        permission: &Permission,
        options: ShareOptions,
    ) -> Result<Permission> {
        let body = serde_json::to_value(permission.to_request(options.transfer_ownership))?;
        let request = ApiRequest::post(GoogleApi::Drive, &format!("files/{}/permissions", file.id))
            .query("fields", "*")
            .query("supportsAllDrives", options.supports_all_drives)
            .query("transferOwnership", options.transfer_ownership)
            .query("sendNotificationEmail", options.send_notification())
            .json(body);

        let value = self.transport.send_json(request).await?;
        let created: Permission = serde_json::from_value(value)?;
        tracing::info!(
            "Shared '{}' ({}) with {:?} as {:?}",
            file.name,
            file.id,
            created.kind,
            created.role
        );

        file.upsert_permission(created.clone());
        Ok(created)
    }

    /// Replays every permission of `from` on `to` and returns how many were applied.
    ///
    /// Individual failures (e.g. an external address the domain rejects) are
    /// logged and skipped.
    pub async fn copy_permissions(
        &self,
        from: &DriveFile,
        to: &mut DriveFile,
        options: ShareOptions,
    ) -> Result<usize> {
        let permissions = if from.permissions.is_empty() {
            self.list_permissions(&from.id).await?
        } else {
            from.permissions.clone()
        };

        let mut applied = 0;
        for permission in &permissions {
            match self.share(to, permission, options).await {
                Ok(_) => applied += 1,
                Err(e) => tracing::warn!(
                    "Skipping permission {:?} from {} on {}: {}",
                    permission.id,
                    from.id,
                    to.id,
                    e
                ),
            }
        }

        tracing::info!(
            "Copied {}/{} permissions from {} to {}",
            applied,
            permissions.len(),
            from.id,
            to.id
        );
        Ok(applied)
    }

    pub async fn about(&self, fields: &str) -> Result<Value> {
        let request = ApiRequest::get(GoogleApi::Drive, "about").query("fields", fields);
        self.transport.send_json(request).await
    }

    pub async fn export_formats(&self) -> Result<ExportFormats> {
        let about = self.about("exportFormats").await?;
        let formats = about.get("exportFormats").cloned().unwrap_or_else(|| json!({}));
        Ok(serde_json::from_value(formats)?)
    }

    /// Downloads a binary (non Workspace) file into `destination_folder`.
    pub async fn download(
        &self,
        file: &DriveFile,
        destination_folder: &Path,
        file_name: Option<&str>,
        open_file: bool,
    ) -> Result<PathBuf> {
        if file.mime_type.is_workspace() {
            return Err(GoogleError::InvalidArgument(format!(
                "'{}' is a {} file; export it instead of downloading",
                file.name, file.mime_type
            )));
        }

        let request = ApiRequest::get(GoogleApi::Drive, &format!("files/{}", file.id))
            .query("alt", "media")
            .query("supportsAllDrives", true);
        let bytes = self.transport.send_bytes(request).await?;

        let path = destination_folder.join(file_name.unwrap_or(&file.name));
        write_file(&path, &bytes).await?;
        tracing::info!("Downloaded '{}' to {}", file.name, path.display());
        if open_file {
            open_local_file(&path)?;
        }
        Ok(path)
    }

    /// Exports a Workspace file into `destination_folder` in the requested format.
    pub async fn export(
        &self,
        file: &DriveFile,
        destination_folder: &Path,
        target: &ExportTarget,
        open_file: bool,
    ) -> Result<PathBuf> {
        let formats = self.export_formats().await?;
        let resolved = target.resolve(file, &formats)?;

        let request = ApiRequest::get(GoogleApi::Drive, &format!("files/{}/export", file.id))
            .query("mimeType", &resolved.mime_type);
        let bytes = self.transport.send_bytes(request).await?;

        let path = destination_folder.join(&resolved.file_name);
        write_file(&path, &bytes).await?;
        tracing::info!(
            "Exported '{}' as {} to {}",
            file.name,
            resolved.mime_type,
            path.display()
        );
        if open_file {
            open_local_file(&path)?;
        }
        Ok(path)
    }

    /// Lists files matching a Drive query, across every page.
    pub async fn list(&self, query: &str, drive_id: Option<&str>) -> Result<Vec<DriveFile>> {
        let mut request = ApiRequest::get(GoogleApi::Drive, "files")
            .query("q", query)
            .query("fields", LIST_FIELDS)
            .query("supportsAllDrives", true)
            .query("includeItemsFromAllDrives", true);
        request = match drive_id {
            Some(drive_id) => request.query("corpora", "drive").query("driveId", drive_id),
            None => request.query("corpora", "user"),
        };

        let items = collect_pages(self.transport.as_ref(), request, "files", None).await?;
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(GoogleError::from))
            .collect()
    }

    pub async fn list_folders_in(
        &self,
        parent_id: &str,
        drive_id: Option<&str>,
    ) -> Result<Vec<DriveFile>> {
        let query = format!(
            "mimeType='{}' and '{}' in parents and trashed=false",
            MimeType::Folder,
            escape_query_value(parent_id)
        );
        self.list(&query, drive_id).await
    }

    /// Id of the folder called `name`. When several match the first is used.
    pub async fn folder_id_by_name(&self, name: &str, drive_id: Option<&str>) -> Result<String> {
        let query = format!(
            "mimeType='{}' and name='{}' and trashed=false",
            MimeType::Folder,
            escape_query_value(name)
        );
        let folders = self.list(&query, drive_id).await?;

        if folders.len() > 1 {
            tracing::warn!("There is more than one folder named '{}'", name);
        }

        folders
            .into_iter()
            .next()
            .map(|folder| folder.id)
            .ok_or_else(|| GoogleError::NotFound(format!("Folder '{}'", name)))
    }

    /// Resolves `a/b/c` to a folder id. The first level must exist; deeper
    /// levels are created when missing.
    pub async fn folder_id_by_path(&self, path: &str, drive_id: Option<&str>) -> Result<String> {
        let mut levels = path.split('/').filter(|level| !level.is_empty());
        let first = levels
            .next()
            .ok_or_else(|| GoogleError::InvalidArgument("Empty folder path".to_string()))?;

        tracing::debug!("Resolving folder path '{}'", path);
        let mut current = self.folder_id_by_name(first, drive_id).await?;

        for level in levels {
            let children = self.list_folders_in(&current, drive_id).await?;
            current = match children.into_iter().find(|child| child.name == level) {
                Some(child) => child.id,
                None => {
                    tracing::info!("Creating folder '{}' inside {}", level, current);
                    self.create_folder(level, Some(&current)).await?.id
                }
            };
        }

        Ok(current)
    }

    /// Uploads a local file with a multipart request.
    pub async fn upload(
        &self,
        local_path: &Path,
        name: Option<&str>,
        mime_type: Option<&str>,
        parent: Option<&str>,
    ) -> Result<DriveFile> {
        let bytes = tokio::fs::read(local_path).await?;
        let name = match name {
            Some(name) => name.to_string(),
            None => local_path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    GoogleError::InvalidArgument(format!(
                        "Cannot take a file name from {}",
                        local_path.display()
                    ))
                })?,
        };
        let mime_type = match mime_type {
            Some(mime) => mime.to_string(),
            None => mime_guess::from_path(local_path)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };

        let mut metadata = json!({ "name": name, "mimeType": mime_type });
        if let Some(parent) = parent {
            metadata["parents"] = json!([parent]);
        }

        let body = multipart_related(&metadata, &mime_type, &bytes);
        let request = ApiRequest::upload(GoogleApi::Drive, "files")
            .query("uploadType", "multipart")
            .query("fields", "*")
            .query("supportsAllDrives", true)
            .raw(
                format!("multipart/related; boundary={}", UPLOAD_BOUNDARY),
                body,
            );

        let file = self.send_file(request).await?;
        tracing::info!("Uploaded {} as '{}' ({})", local_path.display(), file.name, file.id);
        Ok(file)
    }

    /// Uploads an image, makes it readable by anyone with the link and
    /// returns a direct URL usable by Slides.
    pub async fn upload_public_image(
        &self,
        local_path: &Path,
        name: &str,
        folder_id: Option<&str>,
    ) -> Result<String> {
        let mut file = self.upload(local_path, Some(name), None, folder_id).await?;
        self.share(
            &mut file,
            &Permission::anyone(Role::Reader),
            ShareOptions::default(),
        )
        .await?;
        Ok(public_file_url(&file.id))
    }

    pub fn open_in_browser(&self, file: &DriveFile) -> Result<()> {
        let url = file.url();
        tracing::debug!("Opening {} in the browser", url);
        open::that(&url)?;
        Ok(())
    }
}

/// Opens a local file with the desktop's default application.
pub fn open_local_file(path: &Path) -> Result<()> {
    tracing::debug!("Opening {}", path.display());
    open::that(path)?;
    Ok(())
}

pub fn public_file_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?id={}", file_id)
}

/// Escapes a value for use inside a single-quoted Drive query string.
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn multipart_related(metadata: &Value, mime_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n--{b}\r\nContent-Type: {mime}\r\n\r\n",
            b = UPLOAD_BOUNDARY,
            meta = metadata,
            mime = mime_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", UPLOAD_BOUNDARY).as_bytes());
    body
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
