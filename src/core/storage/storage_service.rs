use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::core::api::GoogleApi;
use crate::core::error::Result;
use crate::core::transport::{ApiRequest, GoogleTransport};

const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Object metadata returned by an upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObject {
    pub bucket: String,
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub media_link: Option<String>,
}

/// Cloud Storage uploads. Objects inherit the bucket's permissions.
pub struct StorageService<T: GoogleTransport> {
    transport: Arc<T>,
}

impl<T: GoogleTransport> Clone for StorageService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: GoogleTransport> StorageService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Uploads `local_path` as `object_name` and returns the object's public URL.
    /// The content type is guessed from the file name.
    pub async fn upload_file(&self, local_path: &Path, bucket: &str, object_name: &str) -> Result<String> {
        let bytes = tokio::fs::read(local_path).await?;
        let content_type = mime_guess::from_path(local_path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        let request = ApiRequest::upload(GoogleApi::Storage, &format!("b/{}/o", bucket))
            .query("uploadType", "media")
            .query("name", object_name)
            .raw(content_type, bytes);
        let value = self.transport.send_json(request).await?;
        let object: StorageObject = serde_json::from_value(value)?;

        tracing::info!(
            "Uploaded {} to gs://{}/{} ({})",
            local_path.display(),
            object.bucket,
            object.name,
            object.content_type.as_deref().unwrap_or("unknown type")
        );
        Ok(public_url(bucket, object_name))
    }
}

/// `https://storage.googleapis.com/<bucket>/<object>` with the object name
/// percent-encoded except for `/`.
pub fn public_url(bucket: &str, object_name: &str) -> String {
    format!("{}/{}/{}", PUBLIC_HOST, bucket, encode_object_name(object_name))
}

pub fn encode_object_name(object_name: &str) -> String {
    urlencoding::encode(object_name).replace("%2F", "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::RequestBody;
    use crate::infra::transport::InMemoryTransport;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn public_urls_keep_slashes() {
        assert_eq!(
            public_url("media", "decks/cover image.png"),
            "https://storage.googleapis.com/media/decks/cover%20image.png"
        );
    }

    #[tokio::test]
    async fn upload_sends_media_with_guessed_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::File::create(&path).unwrap().write_all(b"png").unwrap();

        let transport = Arc::new(InMemoryTransport::new());
        let storage = StorageService::new(Arc::clone(&transport));
        transport.push_json(json!({ "bucket": "b1", "name": "img/logo.png", "contentType": "image/png" }));

        let url = storage.upload_file(&path, "b1", "img/logo.png").await.unwrap();

        assert_eq!(url, "https://storage.googleapis.com/b1/img/logo.png");
        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "https://storage.googleapis.com/upload/storage/v1/b/b1/o");
        assert_eq!(sent.query_value("uploadType"), Some("media"));
        assert_eq!(sent.query_value("name"), Some("img/logo.png"));
        assert_eq!(
            sent.body,
            RequestBody::Raw { content_type: "image/png".into(), bytes: b"png".to_vec() }
        );
    }
}
