use std::collections::HashMap;

use serde::Deserialize;

use super::drive_models::{DriveFile, MimeType};
use crate::core::error::{GoogleError, Result};

/// Export targets Drive supports per source MIME type (`about.exportFormats`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExportFormats(pub HashMap<String, Vec<String>>);

impl ExportFormats {
    pub fn supported(&self, source: &MimeType) -> &[String] {
        self.0
            .get(source.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Unknown sources are not validated; Drive has the final word.
    pub fn allows(&self, source: &MimeType, target: &str) -> bool {
        let supported = self.supported(source);
        supported.is_empty() || supported.iter().any(|m| m == target)
    }
}

/// Default export format for each Workspace type.
pub fn default_export_mime(source: &MimeType) -> Option<&'static str> {
    match source {
        MimeType::Document => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        MimeType::Spreadsheet => {
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        }
        MimeType::Presentation => {
            Some("application/vnd.openxmlformats-officedocument.presentationml.presentation")
        }
        MimeType::Drawing => Some("image/jpeg"),
        MimeType::Jam => Some("application/pdf"),
        MimeType::Script => Some("application/vnd.google-apps.script+json"),
        MimeType::Form => Some("application/zip"),
        MimeType::Site => Some("text/plain"),
        MimeType::Folder | MimeType::Other(_) => None,
    }
}

/// File extension to use for an exported MIME type.
pub fn extension_for(mime: &str) -> Option<&'static str> {
    let known = match mime {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some("docx"),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some("xlsx"),
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => Some("pptx"),
        "application/vnd.oasis.opendocument.text" => Some("odt"),
        "application/vnd.oasis.opendocument.spreadsheet" | "application/x-vnd.oasis.opendocument.spreadsheet" => {
            Some("ods")
        }
        "application/vnd.oasis.opendocument.presentation" => Some("odp"),
        "application/vnd.google-apps.script+json" => Some("json"),
        "application/pdf" => Some("pdf"),
        "application/zip" => Some("zip"),
        "application/rtf" => Some("rtf"),
        "application/epub+zip" => Some("epub"),
        "text/plain" => Some("txt"),
        "text/html" => Some("html"),
        "text/csv" => Some("csv"),
        "text/tab-separated-values" => Some("tsv"),
        "text/markdown" => Some("md"),
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    };

    known.or_else(|| {
        mime_guess::get_mime_extensions_str(mime).and_then(|exts| exts.first().copied())
    })
}

/// How the caller wants an export named and formatted.
///
/// Precedence when several are set: `file_name`, then `mime_type`, then
/// `extension`. With none set the default format of the source type is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTarget {
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub extension: Option<String>,
}

/// The MIME type to request and the file name to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExport {
    pub mime_type: String,
    pub file_name: String,
}

impl ExportTarget {
    pub fn file_name(name: impl Into<String>) -> Self {
        Self {
            file_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn mime_type(mime: impl Into<String>) -> Self {
        Self {
            mime_type: Some(mime.into()),
            ..Self::default()
        }
    }

    pub fn extension(ext: impl Into<String>) -> Self {
        Self {
            extension: Some(ext.into()),
            ..Self::default()
        }
    }

    pub fn resolve(&self, file: &DriveFile, formats: &ExportFormats) -> Result<ResolvedExport> {
        let source = &file.mime_type;
        if !source.is_workspace() {
            return Err(GoogleError::InvalidArgument(format!(
                "'{}' is a {} file; download it instead of exporting",
                file.name, source
            )));
        }

        let resolved = if let Some(name) = &self.file_name {
            let mime = guess_from_path(name)?;
            ResolvedExport {
                mime_type: mime,
                file_name: name.clone(),
            }
        } else if let Some(mime) = &self.mime_type {
            ResolvedExport {
                mime_type: mime.clone(),
                file_name: with_extension(&file.name, extension_for(mime)),
            }
        } else if let Some(ext) = &self.extension {
            let ext = ext.trim_start_matches('.');
            let mime = mime_for_extension(ext).ok_or_else(|| {
                GoogleError::InvalidArgument(format!("Unknown export extension '{}'", ext))
            })?;
            ResolvedExport {
                file_name: with_extension(&file.name, Some(ext)),
                mime_type: mime,
            }
        } else {
            let mime = default_export_mime(source).ok_or_else(|| {
                GoogleError::InvalidArgument(format!("{} files cannot be exported", source))
            })?;
            ResolvedExport {
                mime_type: mime.to_string(),
                file_name: with_extension(&file.name, extension_for(mime)),
            }
        };

        if !formats.allows(source, &resolved.mime_type) {
            return Err(GoogleError::InvalidArgument(format!(
                "{} cannot be exported as {}. Supported: {}",
                source,
                resolved.mime_type,
                formats.supported(source).join(", ")
            )));
        }

        Ok(resolved)
    }
}

fn guess_from_path(name: &str) -> Result<String> {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
        .ok_or_else(|| {
            GoogleError::InvalidArgument(format!("Cannot infer an export format from '{}'", name))
        })
}

// Apps Script projects export as JSON under their own MIME type.
fn mime_for_extension(ext: &str) -> Option<String> {
    if ext.eq_ignore_ascii_case("json") {
        return Some("application/vnd.google-apps.script+json".to_string());
    }
    mime_guess::from_ext(ext).first_raw().map(str::to_string)
}

fn with_extension(name: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}.{}", name, ext),
        None => name.to_string(),
    }
}
