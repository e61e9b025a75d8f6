pub mod drive_item;
pub mod drive_models;
pub mod drive_service;
pub mod export;

pub use drive_item::{ensure_mime, DriveItem, Folder, GenericFile};
pub use drive_models::{
    CopyOptions, DriveFile, MimeType, Permission, PermissionType, Role, ShareOptions,
};
pub use drive_service::{escape_query_value, open_local_file, public_file_url, DriveService};
pub use export::{extension_for, ExportFormats, ExportTarget, ResolvedExport};
