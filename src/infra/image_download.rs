// Fetches images from plain (unauthenticated) URLs onto disk, e.g. chart
// renders or logos that are later uploaded into Drive or Slides.

use std::path::{Path, PathBuf};

use reqwest::{header::CONTENT_TYPE, Client, Url};
use tracing::{debug, error, info};

use crate::core::drive::{extension_for, open_local_file};
use crate::core::error::{GoogleError, Result};
use crate::infra::config::Config;

pub struct ImageDownloader {
    client: Client,
}

impl ImageDownloader {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GoogleError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Downloads `image_url` into `destination_folder`.
    ///
    /// The file keeps the URL's base name unless `file_name` is given. A URL
    /// without an extension is saved as `image.<ext>` with the extension taken
    /// from the response's content type.
    pub async fn download_image_from_url(
        &self,
        image_url: &str,
        destination_folder: &Path,
        file_name: Option<&str>,
        open_file: bool,
    ) -> Result<PathBuf> {
        debug!("GET {}", image_url);
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| GoogleError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("Image download failed ({}): {}", status, image_url);
            return Err(GoogleError::Api {
                status: status.as_u16(),
                message: format!("Failed to download {}", image_url),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GoogleError::Http(e.to_string()))?;

        let path = save_image(
            image_url,
            destination_folder,
            file_name,
            content_type.as_deref(),
            &bytes,
        )
        .await?;
        if open_file {
            open_local_file(&path)?;
        }
        Ok(path)
    }
}

/// Local file name for an image fetched from `image_url`.
pub fn image_file_name(
    image_url: &str,
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<String> {
    if let Some(name) = file_name {
        return Ok(name.to_string());
    }

    let url = Url::parse(image_url)
        .map_err(|e| GoogleError::InvalidArgument(format!("Bad image URL '{}': {}", image_url, e)))?;
    let base_name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    if Path::new(base_name).extension().is_some() {
        return Ok(base_name.to_string());
    }

    let extension = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
        .and_then(extension_for)
        .ok_or_else(|| {
            GoogleError::InvalidArgument(format!(
                "Cannot tell the image type of {} (content type {:?}); pass a file name",
                image_url, content_type
            ))
        })?;
    Ok(format!("image.{}", extension))
}

async fn save_image(
    image_url: &str,
    destination_folder: &Path,
    file_name: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<PathBuf> {
    let path = destination_folder.join(image_file_name(image_url, file_name, content_type)?);
    if !destination_folder.as_os_str().is_empty() {
        tokio::fs::create_dir_all(destination_folder).await?;
    }
    tokio::fs::write(&path, bytes).await?;
    info!("Downloaded {} to {}", image_url, path.display());
    Ok(path)
}
