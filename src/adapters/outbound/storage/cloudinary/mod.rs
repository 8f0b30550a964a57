//! Cloudinary storage backend
//!
//! Talks to the Cloudinary upload API directly over HTTPS. Requests are
//! signed with SHA-256 over the sorted request parameters and the API secret.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::debug;

use super::error::StoreError;
use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::StoredPhoto,
        value_objects::PhotoKey,
    },
    ports::storage::PhotoStore,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";
pub const DEFAULT_DELIVERY_BASE_URL: &str = "https://res.cloudinary.com";

/// Configuration for the Cloudinary backend
#[derive(Debug, Clone, PartialEq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
    pub delivery_base_url: String,
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            delivery_base_url: DEFAULT_DELIVERY_BASE_URL.to_string(),
        }
    }

    /// Parse a `cloudinary://<api_key>:<api_secret>@<cloud_name>` URL
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        let invalid = || {
            StoreError::Config(
                "CLOUDINARY_URL must look like cloudinary://<api_key>:<api_secret>@<cloud_name>"
                    .to_string(),
            )
        };

        let rest = url.trim().strip_prefix("cloudinary://").ok_or_else(invalid)?;
        let (credentials, cloud_name) = rest.rsplit_once('@').ok_or_else(invalid)?;
        let (api_key, api_secret) = credentials.split_once(':').ok_or_else(invalid)?;
        let cloud_name = cloud_name.trim_end_matches('/');

        if api_key.is_empty() || api_secret.is_empty() || cloud_name.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(cloud_name, api_key, api_secret))
    }

    fn endpoint(&self, resource_type: ResourceType, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base_url.trim_end_matches('/'),
            self.cloud_name,
            resource_type.as_str(),
            action
        )
    }
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv", "avi", "ogv"];

/// Cloudinary asset class; uploads, destroys and delivery URLs are scoped by it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Video,
    Raw,
}

impl ResourceType {
    const ALL: [ResourceType; 3] = [ResourceType::Image, ResourceType::Video, ResourceType::Raw];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
            ResourceType::Raw => "raw",
        }
    }

    /// Class for an upload. Cloudinary files PDFs under `image`.
    pub fn for_content_type(content_type: &str) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime.starts_with("video/") {
            ResourceType::Video
        } else if mime.starts_with("image/") || mime == "application/pdf" {
            ResourceType::Image
        } else {
            ResourceType::Raw
        }
    }

    /// Best guess for an existing object, from the extension kept in its key
    pub fn for_key(key: &PhotoKey) -> Self {
        let extension = key
            .file_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => ResourceType::Video,
            _ => ResourceType::Image,
        }
    }

    /// The guessed class first, then every other one
    fn lookup_order(key: &PhotoKey) -> Vec<Self> {
        let first = Self::for_key(key);
        std::iter::once(first)
            .chain(Self::ALL.into_iter().filter(|t| *t != first))
            .collect()
    }
}

/// Sign request parameters the way the Cloudinary API expects
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Photo store that keeps objects in Cloudinary
pub struct CloudinaryPhotoStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryPhotoStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn signed_params(&self, key: &PhotoKey) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("public_id", key.as_str().to_string());
        params.insert("timestamp", Utc::now().timestamp().to_string());
        params
    }

    async fn read_error(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("request failed with status {}", status),
        };

        StoreError::Cloudinary { status, message }
    }

    async fn upload(
        &self,
        key: &PhotoKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<UploadResponse, StoreError> {
        let params = self.signed_params(key);
        let signature = sign_params(&params, &self.config.api_secret);

        let file = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(key.file_name().to_string())
            .mime_str(content_type)?;

        let mut form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", file);
        for (name, value) in params {
            form = form.text(name, value);
        }

        let resource_type = ResourceType::for_content_type(content_type);
        let response = self
            .client
            .post(self.config.endpoint(resource_type, "upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn destroy(
        &self,
        key: &PhotoKey,
        resource_type: ResourceType,
    ) -> Result<DestroyResponse, StoreError> {
        let mut params = self.signed_params(key);
        let signature = sign_params(&params, &self.config.api_secret);
        params.insert("api_key", self.config.api_key.clone());
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());

        let response = self
            .client
            .post(self.config.endpoint(resource_type, "destroy"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PhotoStore for CloudinaryPhotoStore {
    async fn put_photo(
        &self,
        key: &PhotoKey,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoredPhoto> {
        let size = data.len();
        let uploaded = self.upload(key, data, content_type).await?;

        debug!(
            photo_key = %key,
            size,
            resource_type = ResourceType::for_content_type(content_type).as_str(),
            "Uploaded photo to Cloudinary"
        );

        Ok(StoredPhoto {
            url: uploaded.secure_url,
            key: key.clone(),
        })
    }

    async fn delete_photo(&self, key: &PhotoKey) -> StorageResult<()> {
        // The key does not record which class the upload landed in
        for resource_type in ResourceType::lookup_order(key) {
            let destroyed = self.destroy(key, resource_type).await?;

            match destroyed.result.as_str() {
                "ok" => return Ok(()),
                "not found" => {
                    debug!(
                        photo_key = %key,
                        resource_type = resource_type.as_str(),
                        "Not found in Cloudinary"
                    );
                }
                other => {
                    return Err(StorageError::StorageBackendError {
                        message: format!("Cloudinary destroy returned '{}'", other),
                    })
                }
            }
        }

        Err(StorageError::ObjectNotFound {
            key: key.to_string(),
        })
    }

    fn public_url(&self, key: &PhotoKey) -> String {
        format!(
            "{}/{}/{}/upload/{}",
            self.config.delivery_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            ResourceType::for_key(key).as_str(),
            key.as_str()
        )
    }
}
