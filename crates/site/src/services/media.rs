//! Image hosting client.
//!
//! Uploads listing images to the external media host over its unsigned
//! upload endpoint and returns the hosted URL plus the host's public id.

use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;

use crate::config::MediaConfig;
use crate::models::ListingImage;

/// Errors from the media host.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Transport-level failure.
    #[error("media request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The host answered with a non-success status.
    #[error("media host returned status {0}")]
    UnexpectedStatus(u16),

    /// The host's response body did not have the expected shape.
    #[error("malformed media host response")]
    MalformedResponse,
}

/// An image file read from a multipart form submission.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Client for the image host.
pub struct MediaClient {
    http: reqwest::Client,
    upload_url: String,
    upload_preset: String,
    folder: String,
}

impl MediaClient {
    /// Build a client from the media configuration.
    #[must_use]
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                config.cloud_name
            ),
            upload_preset: config.upload_preset.clone(),
            folder: config.folder.clone(),
        }
    }

    /// Upload an image and return its hosted location.
    ///
    /// # Errors
    ///
    /// Returns `MediaError` if the upload request fails, the host rejects
    /// it, or the response cannot be parsed.
    pub async fn upload(&self, image: UploadedImage) -> Result<ListingImage, MediaError> {
        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(MediaError::Request)?;

        let form = multipart::Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.folder.clone())
            .part("file", part);

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "image upload rejected");
            return Err(MediaError::UnexpectedStatus(status.as_u16()));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|_| MediaError::MalformedResponse)?;

        Ok(ListingImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }
}
