use api::BackendGateway;
use common::{LuminError, LuminResult, config::LuminConfig};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{ImageFormat, UploadedPhoto};
use crate::naming::{object_name_from_url, object_names_now};

/// Uploads outfit photos to the storage bucket and removes them again
#[derive(Clone)]
pub struct MediaUploader {
    gateway: Arc<dyn BackendGateway>,
    max_image_size: usize,
}

impl MediaUploader {
    pub fn new(gateway: Arc<dyn BackendGateway>, max_image_size: usize) -> Self {
        Self {
            gateway,
            max_image_size,
        }
    }

    pub fn from_config(gateway: Arc<dyn BackendGateway>, config: &LuminConfig) -> Self {
        Self::new(gateway, config.max_image_size)
    }

    /// Check photos before any upload starts
    pub fn validate(&self, photos: &[Vec<u8>]) -> LuminResult<()> {
        if photos.is_empty() {
            return Err(LuminError::Validation(
                "Add at least one photo".to_string(),
            ));
        }

        for (index, bytes) in photos.iter().enumerate() {
            if bytes.is_empty() {
                return Err(LuminError::Validation(format!("Photo {} is empty", index + 1)));
            }
            if bytes.len() > self.max_image_size {
                return Err(LuminError::Validation(format!(
                    "Photo {} is larger than {} KB",
                    index + 1,
                    self.max_image_size / 1024
                )));
            }
            if ImageFormat::detect(bytes) != ImageFormat::Jpeg {
                return Err(LuminError::Validation(format!(
                    "Photo {} must be a JPEG image",
                    index + 1
                )));
            }
        }
        Ok(())
    }

    /// Upload photos in order and return them in the same order
    ///
    /// If one upload fails, photos stored earlier in the batch are deleted
    /// (best-effort) and `UploadFailed` is returned.
    pub async fn upload_photos(&self, photos: Vec<Vec<u8>>) -> LuminResult<Vec<UploadedPhoto>> {
        self.validate(&photos)?;

        let names = object_names_now(photos.len());
        let mut uploaded: Vec<UploadedPhoto> = Vec::with_capacity(photos.len());

        for (bytes, object_name) in photos.into_iter().zip(names) {
            let size = bytes.len();
            match self.gateway.upload_image(bytes, &object_name).await {
                Ok(url) => {
                    info!("Uploaded photo {} ({} bytes)", object_name, size);
                    uploaded.push(UploadedPhoto {
                        object_name,
                        url,
                        size,
                    });
                }
                Err(e) => {
                    warn!("Upload of {} failed: {}", object_name, e);
                    self.remove_objects(uploaded.iter().map(|p| p.object_name.as_str()))
                        .await;
                    return Err(match e {
                        LuminError::UploadFailed(msg) => LuminError::UploadFailed(msg),
                        other => LuminError::UploadFailed(format!("{}: {}", object_name, other)),
                    });
                }
            }
        }

        Ok(uploaded)
    }

    /// Delete the stored photos behind `urls`; failures are logged only
    ///
    /// URLs that do not point into the bucket are skipped.
    pub async fn delete_photos(&self, urls: &[String]) {
        let prefix = self.gateway.public_image_prefix();
        let names = urls.iter().filter_map(|url| {
            let name = object_name_from_url(url, &prefix);
            if name.is_none() {
                info!("Skipping non-storage photo reference {}", url);
            }
            name
        });
        self.remove_objects(names).await;
    }

    async fn remove_objects<'a>(&self, names: impl Iterator<Item = &'a str>) {
        for name in names {
            if let Err(e) = self.gateway.delete_image(name).await {
                warn!("Failed to delete photo {}: {}", name, e);
            }
        }
    }
}
