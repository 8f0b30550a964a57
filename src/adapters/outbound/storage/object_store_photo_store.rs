use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::{
    memory::InMemory, path::Path as ObjectPath, signer::Signer, Attribute, Attributes,
    ObjectStore as ApacheObjectStore, PutOptions, PutPayload,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::StoredPhoto,
        value_objects::PhotoKey,
    },
    ports::storage::PhotoStore,
};

pub const IN_MEMORY_BASE_URL: &str = "memory://photos";

/// Photo store backed by any Apache `object_store` implementation
/// (in-memory, S3, S3-compatible endpoints)
pub struct ObjectStorePhotoStore {
    inner: Arc<dyn ApacheObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    public_base_url: String,
}

impl ObjectStorePhotoStore {
    pub fn new(store: Arc<dyn ApacheObjectStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            inner: store,
            signer: None,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Process-local store for development and tests
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), IN_MEMORY_BASE_URL)
    }

    /// Enable pre-signed direct uploads
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    fn to_object_path(key: &PhotoKey) -> ObjectPath {
        ObjectPath::from(key.as_str())
    }

    /// Read a photo back from storage
    pub async fn fetch_photo(&self, key: &PhotoKey) -> StorageResult<Bytes> {
        let path = Self::to_object_path(key);

        let result = self.inner.get(&path).await?;
        let bytes = result.bytes().await?;

        Ok(bytes)
    }

    pub async fn photo_exists(&self, key: &PhotoKey) -> StorageResult<bool> {
        let path = Self::to_object_path(key);

        match self.inner.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Every key currently stored
    pub async fn list_keys(&self) -> StorageResult<Vec<PhotoKey>> {
        use futures::TryStreamExt;

        let metas: Vec<_> = self.inner.list(None).try_collect().await?;

        metas
            .into_iter()
            .map(|meta| {
                PhotoKey::new(meta.location.to_string()).map_err(|e| {
                    StorageError::ValidationError {
                        message: format!("Invalid photo key from store: {}", e),
                    }
                })
            })
            .collect()
    }
}

#[async_trait]
impl PhotoStore for ObjectStorePhotoStore {
    async fn put_photo(
        &self,
        key: &PhotoKey,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<StoredPhoto> {
        let path = Self::to_object_path(key);
        let size = data.len();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.inner
            .put_opts(&path, PutPayload::from(data), options)
            .await?;

        debug!(photo_key = %key, size, "Stored photo object");

        Ok(StoredPhoto {
            url: self.public_url(key),
            key: key.clone(),
        })
    }

    async fn delete_photo(&self, key: &PhotoKey) -> StorageResult<()> {
        let path = Self::to_object_path(key);

        self.inner.delete(&path).await?;

        Ok(())
    }

    fn public_url(&self, key: &PhotoKey) -> String {
        format!("{}/{}", self.public_base_url, key.as_str())
    }

    /// Pre-sign a `PUT` for `key`. `object_store` signs the method and path
    /// only (`X-Amz-SignedHeaders=host`), so the URL does not bind the content
    /// type; callers check it against the policy before asking for a URL.
    async fn sign_upload_url(
        &self,
        key: &PhotoKey,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| StorageError::UnsupportedOperation {
                operation: "sign_upload_url".to_string(),
                reason: "this storage backend cannot pre-sign URLs".to_string(),
            })?;

        let path = Self::to_object_path(key);
        let url = signer.signed_url(Method::PUT, &path, expires_in).await?;

        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(value: &str) -> PhotoKey {
        PhotoKey::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_basic_photo_operations() {
        let store = ObjectStorePhotoStore::in_memory();
        let key = key("1700000000000-a.png");

        let stored = store
            .put_photo(&key, Bytes::from_static(b"PNGDATA"), "image/png")
            .await
            .unwrap();
        assert_eq!(stored.key, key);
        assert_eq!(stored.url, "memory://photos/1700000000000-a.png");

        assert_eq!(store.fetch_photo(&key).await.unwrap(), Bytes::from_static(b"PNGDATA"));
        assert!(store.photo_exists(&key).await.unwrap());
        assert_eq!(store.list_keys().await.unwrap(), vec![key.clone()]);

        store.delete_photo(&key).await.unwrap();
        assert!(!store.photo_exists(&key).await.unwrap());
        assert!(store.fetch_photo(&key).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_nested_keys_and_base_url() {
        let store = ObjectStorePhotoStore::new(Arc::new(InMemory::new()), "https://cdn.example.com/");
        let key = key("my_uploads/1-a.png");

        let stored = store
            .put_photo(&key, Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();

        assert_eq!(stored.url, "https://cdn.example.com/my_uploads/1-a.png");
        assert!(store.photo_exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_signing_requires_signer() {
        let store = ObjectStorePhotoStore::in_memory();

        let err = store
            .sign_upload_url(&key("1-a.png"), "image/png", Duration::from_secs(60))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::UnsupportedOperation { .. }));
    }
}
