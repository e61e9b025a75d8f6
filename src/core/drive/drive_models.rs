use std::fmt;

use serde::{Deserialize, Serialize};

/// Drive MIME types the crate dispatches on. Anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MimeType {
    Folder,
    Document,
    Spreadsheet,
    Presentation,
    Drawing,
    Form,
    Script,
    Site,
    Jam,
    Other(String),
}

impl MimeType {
    pub fn as_str(&self) -> &str {
        match self {
            MimeType::Folder => "application/vnd.google-apps.folder",
            MimeType::Document => "application/vnd.google-apps.document",
            MimeType::Spreadsheet => "application/vnd.google-apps.spreadsheet",
            MimeType::Presentation => "application/vnd.google-apps.presentation",
            MimeType::Drawing => "application/vnd.google-apps.drawing",
            MimeType::Form => "application/vnd.google-apps.form",
            MimeType::Script => "application/vnd.google-apps.script",
            MimeType::Site => "application/vnd.google-apps.site",
            MimeType::Jam => "application/vnd.google-apps.jam",
            MimeType::Other(mime) => mime,
        }
    }

    /// Native Google Workspace files must be exported, everything else is downloaded.
    pub fn is_workspace(&self) -> bool {
        match self {
            MimeType::Other(mime) => mime.starts_with("application/vnd.google-apps."),
            _ => true,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, MimeType::Folder)
    }
}

impl Default for MimeType {
    fn default() -> Self {
        MimeType::Other("application/octet-stream".to_string())
    }
}

impl From<String> for MimeType {
    fn from(value: String) -> Self {
        MimeType::from(value.as_str())
    }
}

impl From<&str> for MimeType {
    fn from(value: &str) -> Self {
        match value {
            "application/vnd.google-apps.folder" => MimeType::Folder,
            "application/vnd.google-apps.document" => MimeType::Document,
            "application/vnd.google-apps.spreadsheet" => MimeType::Spreadsheet,
            "application/vnd.google-apps.presentation" => MimeType::Presentation,
            "application/vnd.google-apps.drawing" => MimeType::Drawing,
            "application/vnd.google-apps.form" => MimeType::Form,
            "application/vnd.google-apps.script" => MimeType::Script,
            "application/vnd.google-apps.site" => MimeType::Site,
            "application/vnd.google-apps.jam" => MimeType::Jam,
            other => MimeType::Other(other.to_string()),
        }
    }
}

impl From<MimeType> for String {
    fn from(value: MimeType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of a file as returned by `files.get` with `fields=*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: MimeType,
    pub web_view_link: Option<String>,
    pub web_content_link: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub drive_id: Option<String>,
}

impl DriveFile {
    pub fn parent_folder_id(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// Link to open the file, falling back to the generic Drive URL.
    pub fn url(&self) -> String {
        self.web_view_link
            .clone()
            .unwrap_or_else(|| format!("https://drive.google.com/open?id={}", self.id))
    }

    /// Inserts or replaces a permission by id.
    pub fn upsert_permission(&mut self, permission: Permission) {
        match self
            .permissions
            .iter_mut()
            .find(|p| p.id.is_some() && p.id == permission.id)
        {
            Some(existing) => *existing = permission,
            None => self.permissions.push(permission),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    User,
    Group,
    Domain,
    Anyone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Owner,
    Organizer,
    FileOrganizer,
    Writer,
    Commenter,
    Reader,
}

/// A permission attached to a Drive file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: PermissionType,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_file_discovery: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Permission {
    pub fn user(email: &str, role: Role) -> Self {
        Self::new(PermissionType::User, role).with_email(email)
    }

    pub fn group(email: &str, role: Role) -> Self {
        Self::new(PermissionType::Group, role).with_email(email)
    }

    pub fn domain(domain: &str, role: Role) -> Self {
        let mut permission = Self::new(PermissionType::Domain, role);
        permission.domain = Some(domain.to_string());
        permission
    }

    pub fn anyone(role: Role) -> Self {
        Self::new(PermissionType::Anyone, role)
    }

    fn new(kind: PermissionType, role: Role) -> Self {
        Self {
            id: None,
            kind,
            role,
            email_address: None,
            domain: None,
            allow_file_discovery: None,
            display_name: None,
        }
    }

    fn with_email(mut self, email: &str) -> Self {
        self.email_address = Some(email.to_string());
        self
    }

    /// The body to recreate this permission on another file.
    ///
    /// Owners become writers unless ownership is being transferred. Email
    /// addresses only apply to users and groups, domains only to domain grants.
    pub fn to_request(&self, transfer_ownership: bool) -> Permission {
        let role = match self.role {
            Role::Owner if !transfer_ownership => Role::Writer,
            role => role,
        };
        let email_address = match self.kind {
            PermissionType::User | PermissionType::Group => self.email_address.clone(),
            _ => None,
        };
        let domain = match self.kind {
            PermissionType::Domain => self.domain.clone(),
            _ => None,
        };

        Permission {
            id: None,
            kind: self.kind,
            role,
            email_address,
            domain,
            allow_file_discovery: self.allow_file_discovery,
            display_name: None,
        }
    }
}

/// Flags sent along with permission changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareOptions {
    pub supports_all_drives: bool,
    pub transfer_ownership: bool,
    pub send_notification_email: bool,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            supports_all_drives: true,
            transfer_ownership: false,
            send_notification_email: false,
        }
    }
}

impl ShareOptions {
    /// Google requires a notification whenever ownership changes hands.
    pub fn send_notification(&self) -> bool {
        self.send_notification_email || self.transfer_ownership
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOptions {
    pub supports_all_drives: bool,
    /// Destination folder. Defaults to the source file's folder.
    pub parent: Option<String>,
    /// Replay the source file's permissions on the copy.
    pub transfer_permissions: Option<ShareOptions>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            supports_all_drives: true,
            parent: None,
            transfer_permissions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mime_types_round_trip_through_strings() {
        let mime: MimeType = "application/vnd.google-apps.spreadsheet".into();
        assert_eq!(mime, MimeType::Spreadsheet);
        assert_eq!(String::from(mime), "application/vnd.google-apps.spreadsheet");

        let pdf: MimeType = "application/pdf".into();
        assert_eq!(pdf, MimeType::Other("application/pdf".into()));
        assert!(!pdf.is_workspace());
        assert!(MimeType::Presentation.is_workspace());
    }

    #[test]
    fn drive_file_deserializes_from_api_shape() {
        let file: DriveFile = serde_json::from_value(json!({
            "id": "f1",
            "name": "Budget",
            "mimeType": "application/vnd.google-apps.spreadsheet",
            "webViewLink": "https://docs.google.com/spreadsheets/d/f1/edit",
            "parents": ["folder-1"],
            "permissions": [
                {"id": "p1", "type": "user", "role": "owner", "emailAddress": "a@example.com"}
            ]
        }))
        .unwrap();

        assert_eq!(file.mime_type, MimeType::Spreadsheet);
        assert_eq!(file.parent_folder_id(), Some("folder-1"));
        assert_eq!(file.permissions[0].role, Role::Owner);
        assert_eq!(file.url(), "https://docs.google.com/spreadsheets/d/f1/edit");
    }

    #[test]
    fn owner_becomes_writer_unless_transferring() {
        let owner = Permission {
            id: Some("p1".into()),
            ..Permission::user("a@example.com", Role::Owner)
        };

        assert_eq!(owner.to_request(false).role, Role::Writer);
        assert_eq!(owner.to_request(true).role, Role::Owner);
        assert_eq!(owner.to_request(false).id, None);
    }

    #[test]
    fn request_keeps_only_fields_valid_for_the_type() {
        let mut domain = Permission::domain("example.com", Role::Reader);
        domain.email_address = Some("stray@example.com".into());

        let body = serde_json::to_value(domain.to_request(false)).unwrap();
        assert_eq!(
            body,
            json!({"type": "domain", "role": "reader", "domain": "example.com"})
        );

        let mut user = Permission::user("u@example.com", Role::Commenter);
        user.domain = Some("example.com".into());
        let body = serde_json::to_value(user.to_request(false)).unwrap();
        assert_eq!(
            body,
            json!({"type": "user", "role": "commenter", "emailAddress": "u@example.com"})
        );
    }

    #[test]
    fn upsert_permission_replaces_by_id() {
        let mut file: DriveFile = serde_json::from_value(json!({"id": "f"})).unwrap();
        let mut permission = Permission::anyone(Role::Reader);
        permission.id = Some("anyoneWithLink".into());
        file.upsert_permission(permission.clone());

        permission.role = Role::Writer;
        file.upsert_permission(permission);

        assert_eq!(file.permissions.len(), 1);
        assert_eq!(file.permissions[0].role, Role::Writer);
    }

    #[test]
    fn notification_is_forced_when_transferring_ownership() {
        let options = ShareOptions {
            transfer_ownership: true,
            ..ShareOptions::default()
        };
        assert!(options.send_notification());
        assert!(!ShareOptions::default().send_notification());
    }
}
