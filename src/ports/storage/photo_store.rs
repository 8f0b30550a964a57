use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::StoredPhoto,
    value_objects::PhotoKey,
};

/// Port for photo object storage
/// This abstracts the actual storage backend (S3, Cloudinary, in-memory)
#[async_trait]
pub trait PhotoStore: Send + Sync + 'static {
    /// Store photo bytes under `key`.
    ///
    /// The returned key is authoritative; a backend may normalize the one it was given.
    async fn put_photo(
        &self,
        key: &PhotoKey,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoredPhoto>;

    /// Delete a photo. Backends may report an already missing object as
    /// `StorageError::ObjectNotFound`; callers treat that as deleted.
    async fn delete_photo(&self, key: &PhotoKey) -> StorageResult<()>;

    /// Public URL at which `key` is served
    fn public_url(&self, key: &PhotoKey) -> String;

    /// Pre-signed URL a client can `PUT` the photo to directly.
    /// Backends are not required to bind `content_type` into the signature.
    async fn sign_upload_url(
        &self,
        key: &PhotoKey,
        _content_type: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::UnsupportedOperation {
            operation: "sign_upload_url".to_string(),
            reason: format!("direct uploads are not supported for '{}'", key),
        })
    }
}
