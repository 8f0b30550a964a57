use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    domain::{
        errors::{ItemError, ItemResult, RepositoryError, ValidationError},
        models::{
            CreateItemRequest, Item, ItemPolicy, NewItem, OrphanReason, OrphanedPhoto,
            PhotoUpload, StoredPhoto, SweepReport, UpdateItemRequest, UploadTicket,
        },
        value_objects::{ItemId, PhotoKey},
    },
    ports::{repositories::ItemRepository, services::ItemService, storage::PhotoStore},
    services::OrphanLedger,
};

/// How long a pre-signed direct upload URL stays valid
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(60);

/// Lifecycle coordinator keeping item records and photo objects in sync.
///
/// Ordering rules:
/// - create uploads before inserting, and removes the upload if the insert fails
/// - update uploads the replacement before deleting the old object
/// - delete removes the object first and keeps the record if that fails
#[derive(Clone)]
pub struct ItemServiceImpl {
    repository: Arc<dyn ItemRepository>,
    store: Arc<dyn PhotoStore>,
    policy: ItemPolicy,
    key_prefix: Option<String>,
    orphans: OrphanLedger,
}

impl ItemServiceImpl {
    pub fn new(
        repository: Arc<dyn ItemRepository>,
        store: Arc<dyn PhotoStore>,
        policy: ItemPolicy,
    ) -> Self {
        Self {
            repository,
            store,
            policy,
            key_prefix: None,
            orphans: OrphanLedger::new(),
        }
    }

    /// Store new photos under `prefix/`
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.key_prefix = Some(prefix).filter(|p| !p.trim_matches('/').is_empty());
        self
    }

    fn new_key(&self, file_name: &str) -> ItemResult<PhotoKey> {
        Ok(PhotoKey::generate(
            self.key_prefix.as_deref(),
            file_name,
            Utc::now(),
        )?)
    }

    async fn load(&self, id: &ItemId) -> ItemResult<Item> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| ItemError::repository("lookup", Some(*id), e))?
            .ok_or(ItemError::NotFound { id: *id })
    }

    async fn upload(&self, photo: PhotoUpload) -> ItemResult<StoredPhoto> {
        let key = self.new_key(&photo.file_name)?;

        debug!(photo_key = %key, bytes = photo.len(), "Uploading photo");

        self.store
            .put_photo(&key, photo.data, &photo.content_type)
            .await
            .map_err(|e| ItemError::storage("upload", Some(key.to_string()), e))
    }

    /// Best-effort removal of an upload whose item was never inserted
    async fn roll_back_upload(&self, photo: &StoredPhoto, cause: &RepositoryError) {
        match self.store.delete_photo(&photo.key).await {
            Ok(()) => {
                debug!(photo_key = %photo.key, "Removed upload after failed insert");
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                warn!(
                    photo_key = %photo.key,
                    insert_error = %cause,
                    error = %e,
                    "Could not remove upload after failed insert"
                );
                self.orphans
                    .record(
                        photo.key.clone(),
                        OrphanReason::FailedRollback,
                        None,
                        e.to_string(),
                    )
                    .await;
            }
        }
    }

    /// Delete the photo a replacement superseded; failures leave a tracked orphan
    async fn discard_replaced(&self, old: &StoredPhoto, id: &ItemId) {
        match self.store.delete_photo(&old.key).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(item_id = %id, photo_key = %old.key, "Replaced photo was already gone");
            }
            Err(e) => {
                warn!(
                    item_id = %id,
                    photo_key = %old.key,
                    error = %e,
                    "Could not delete replaced photo"
                );
                self.orphans
                    .record(
                        old.key.clone(),
                        OrphanReason::ReplacedPhoto,
                        Some(*id),
                        e.to_string(),
                    )
                    .await;
            }
        }
    }
}

#[async_trait]
impl ItemService for ItemServiceImpl {
    #[instrument(skip_all, fields(has_photo = photo.is_some()))]
    async fn create_item(
        &self,
        request: CreateItemRequest,
        photo: Option<PhotoUpload>,
    ) -> ItemResult<Item> {
        self.policy.validate_create(&request, photo.as_ref())?;
        let price = request
            .price
            .ok_or(ValidationError::MissingField("price"))?;

        let stored = match photo {
            Some(photo) => Some(self.upload(photo).await?),
            None => None,
        };

        let new_item = NewItem {
            name: request.name.unwrap_or_default(),
            price,
            note: request.note.unwrap_or_default(),
            category: request.category.filter(|c| !c.trim().is_empty()),
            photo: stored.clone(),
        };

        match self.repository.insert(new_item).await {
            Ok(item) => {
                info!(item_id = %item.id, "Item created");
                Ok(item)
            }
            Err(e) => {
                if let Some(stored) = &stored {
                    self.roll_back_upload(stored, &e).await;
                }
                Err(ItemError::repository("insert", None, e))
            }
        }
    }

    async fn list_items(&self) -> ItemResult<Vec<Item>> {
        self.repository
            .find_all()
            .await
            .map_err(|e| ItemError::repository("list", None, e))
    }

    async fn get_item(&self, id: &ItemId) -> ItemResult<Item> {
        self.load(id).await
    }

    #[instrument(skip_all, fields(item_id = %id, has_photo = photo.is_some()))]
    async fn update_item(
        &self,
        id: &ItemId,
        changes: UpdateItemRequest,
        photo: Option<PhotoUpload>,
    ) -> ItemResult<Item> {
        let mut item = self.load(id).await?;
        self.policy
            .validate_update(&item, &changes, photo.as_ref())?;

        // Nothing has been mutated until the replacement exists in storage
        let replacement = match photo {
            Some(photo) => Some(self.upload(photo).await?),
            None => None,
        };

        let previous_key = item.photo.as_ref().map(|old| old.key.clone());
        if let Some(new_photo) = &replacement {
            if let Some(old) = item.photo.as_ref().filter(|old| old.key != new_photo.key) {
                self.discard_replaced(old, id).await;
            }
            item.photo = Some(new_photo.clone());
        }

        changes.apply_to(&mut item);

        match self.repository.update(&item).await {
            Ok(saved) => {
                info!(item_id = %saved.id, photo_replaced = replacement.is_some(), "Item updated");
                Ok(saved)
            }
            Err(e) => {
                // A key the stored record already references is not orphaned
                let unsaved = replacement
                    .as_ref()
                    .filter(|new_photo| previous_key.as_ref() != Some(&new_photo.key));
                if let Some(new_photo) = unsaved {
                    error!(
                        item_id = %id,
                        photo_key = %new_photo.key,
                        error = %e,
                        "Replacement photo uploaded but item could not be saved"
                    );
                    self.orphans
                        .record(
                            new_photo.key.clone(),
                            OrphanReason::UnsavedReplacement,
                            Some(*id),
                            e.to_string(),
                        )
                        .await;
                }
                Err(match e {
                    RepositoryError::NotFound { id } => ItemError::NotFound { id },
                    other => ItemError::repository("update", Some(*id), other),
                })
            }
        }
    }

    #[instrument(skip_all, fields(item_id = %id))]
    async fn delete_item(&self, id: &ItemId) -> ItemResult<()> {
        let item = self.load(id).await?;

        if let Some(photo) = &item.photo {
            match self.store.delete_photo(&photo.key).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    debug!(photo_key = %photo.key, "Photo already absent from storage");
                }
                Err(e) => {
                    warn!(photo_key = %photo.key, error = %e, "Photo delete failed, keeping item");
                    return Err(ItemError::storage("delete", Some(photo.key.to_string()), e));
                }
            }
        }

        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(|e| ItemError::repository("delete", Some(*id), e))?;

        if !removed {
            return Err(ItemError::NotFound { id: *id });
        }

        info!("Item deleted");
        Ok(())
    }

    async fn create_upload_ticket(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> ItemResult<UploadTicket> {
        if file_name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        if content_type.trim().is_empty() {
            return Err(ValidationError::MissingField("type").into());
        }
        self.policy.validate_content_type(content_type)?;

        let key = self.new_key(file_name)?;
        let upload_url = self
            .store
            .sign_upload_url(&key, content_type, UPLOAD_URL_TTL)
            .await
            .map_err(|e| ItemError::storage("sign", Some(key.to_string()), e))?;

        Ok(UploadTicket {
            upload_url,
            file_url: self.store.public_url(&key),
            file_key: key,
        })
    }

    async fn pending_orphans(&self) -> Vec<OrphanedPhoto> {
        self.orphans.pending().await
    }

    #[instrument(skip_all)]
    async fn sweep_orphans(&self) -> SweepReport {
        let mut report = SweepReport::default();

        for orphan in self.orphans.pending().await {
            match self.store.delete_photo(&orphan.key).await {
                Ok(()) => {
                    self.orphans.resolve(&orphan.key).await;
                    report.removed.push(orphan.key);
                }
                Err(e) if e.is_not_found() => {
                    self.orphans.resolve(&orphan.key).await;
                    report.removed.push(orphan.key);
                }
                Err(e) => {
                    warn!(photo_key = %orphan.key, error = %e, "Orphan cleanup failed");
                    self.orphans.mark_failed(&orphan.key, e.to_string()).await;
                    report.still_pending.push(orphan.key);
                }
            }
        }

        info!(
            removed = report.removed.len(),
            still_pending = report.still_pending.len(),
            "Orphan sweep finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::{
            persistence::InMemoryItemRepository, storage::ObjectStorePhotoStore,
        },
        domain::{
            errors::{StorageError, StorageResult},
            value_objects::Price,
        },
    };
    use bytes::Bytes;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Photo store that can be told to fail, counting every call
    struct FlakyStore {
        inner: ObjectStorePhotoStore,
        fail_put: AtomicBool,
        fail_delete: AtomicBool,
        /// Normalizes every upload onto this key, as some backends do
        fixed_key: Mutex<Option<PhotoKey>>,
        puts: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: ObjectStorePhotoStore::in_memory(),
                fail_put: AtomicBool::new(false),
                fail_delete: AtomicBool::new(false),
                fixed_key: Mutex::new(None),
                puts: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
            }
        }

        fn outage() -> StorageError {
            StorageError::StorageBackendError {
                message: "simulated outage".to_string(),
            }
        }
    }

    #[async_trait]
    impl PhotoStore for FlakyStore {
        async fn put_photo(
            &self,
            key: &PhotoKey,
            data: Bytes,
            content_type: &str,
        ) -> StorageResult<StoredPhoto> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if self.fail_put.load(Ordering::SeqCst) {
                return Err(Self::outage());
            }
            let key = self
                .fixed_key
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| key.clone());
            self.inner.put_photo(&key, data, content_type).await
        }

        async fn delete_photo(&self, key: &PhotoKey) -> StorageResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(Self::outage());
            }
            self.inner.delete_photo(key).await
        }

        fn public_url(&self, key: &PhotoKey) -> String {
            self.inner.public_url(key)
        }
    }

    /// Repository whose writes can be told to fail
    struct FlakyRepository {
        inner: InMemoryItemRepository,
        fail_insert: AtomicBool,
        fail_update: AtomicBool,
    }

    impl FlakyRepository {
        fn new() -> Self {
            Self {
                inner: InMemoryItemRepository::new(),
                fail_insert: AtomicBool::new(false),
                fail_update: AtomicBool::new(false),
            }
        }

        fn outage() -> RepositoryError {
            RepositoryError::Database {
                message: "simulated outage".to_string(),
                source: None,
            }
        }
    }

    #[async_trait]
    impl ItemRepository for FlakyRepository {
        async fn insert(&self, item: NewItem) -> crate::domain::errors::RepositoryResult<Item> {
            if self.fail_insert.load(Ordering::SeqCst) {
                return Err(Self::outage());
            }
            self.inner.insert(item).await
        }

        async fn find_all(&self) -> crate::domain::errors::RepositoryResult<Vec<Item>> {
            self.inner.find_all().await
        }

        async fn find_by_id(
            &self,
            id: &ItemId,
        ) -> crate::domain::errors::RepositoryResult<Option<Item>> {
            self.inner.find_by_id(id).await
        }

        async fn update(&self, item: &Item) -> crate::domain::errors::RepositoryResult<Item> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(Self::outage());
            }
            self.inner.update(item).await
        }

        async fn delete(&self, id: &ItemId) -> crate::domain::errors::RepositoryResult<bool> {
            self.inner.delete(id).await
        }
    }

    fn setup() -> (ItemServiceImpl, Arc<FlakyStore>, Arc<FlakyRepository>) {
        let store = Arc::new(FlakyStore::new());
        let repository = Arc::new(FlakyRepository::new());
        let service = ItemServiceImpl::new(repository.clone(), store.clone(), ItemPolicy::default());
        (service, store, repository)
    }

    fn mug() -> CreateItemRequest {
        CreateItemRequest {
            name: Some("Mug".to_string()),
            price: Some(Price::new(10.0).unwrap()),
            ..Default::default()
        }
    }

    fn png(data: &'static [u8], file_name: &str) -> PhotoUpload {
        PhotoUpload::new(data, Some("image/png".to_string()), file_name)
    }

    #[tokio::test]
    async fn test_validation_happens_before_upload() {
        let (service, store, _) = setup();

        let err = service
            .create_item(CreateItemRequest::default(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ItemError::Validation(ValidationError::MissingField("price"))
        ));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_upload_creates_nothing() {
        let (service, store, repository) = setup();
        store.fail_put.store(true, Ordering::SeqCst);

        let err = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap_err();

        assert!(matches!(err, ItemError::Storage { operation: "upload", .. }));
        assert!(repository.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_insert_removes_upload() {
        let (service, store, repository) = setup();
        repository.fail_insert.store(true, Ordering::SeqCst);

        let err = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap_err();

        assert!(matches!(err, ItemError::Repository { operation: "insert", .. }));
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
        assert!(store.inner.list_keys().await.unwrap().is_empty());
        assert!(service.pending_orphans().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_insert_and_failed_rollback_is_tracked() {
        let (service, store, repository) = setup();
        repository.fail_insert.store(true, Ordering::SeqCst);
        store.fail_delete.store(true, Ordering::SeqCst);

        let err = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap_err();

        // the rollback failure is logged and tracked, not surfaced
        assert!(matches!(err, ItemError::Repository { .. }));
        let orphans = service.pending_orphans().await;
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].reason, OrphanReason::FailedRollback);
    }

    #[tokio::test]
    async fn test_failed_replacement_upload_leaves_item_untouched() {
        let (service, store, _) = setup();
        let created = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap();

        store.fail_put.store(true, Ordering::SeqCst);
        let err = service
            .update_item(
                &created.id,
                UpdateItemRequest {
                    price: Some(Price::new(99.0).unwrap()),
                    ..Default::default()
                },
                Some(png(b"NEW", "b.png")),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ItemError::Storage { .. }));
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);

        let current = service.get_item(&created.id).await.unwrap();
        assert_eq!(current, created);
    }

    #[tokio::test]
    async fn test_old_photo_delete_failure_does_not_block_update() {
        let (service, store, _) = setup();
        let created = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap();
        let old_key = created.photo.clone().unwrap().key;

        store.fail_delete.store(true, Ordering::SeqCst);
        let updated = service
            .update_item(
                &created.id,
                UpdateItemRequest::default(),
                Some(png(b"NEW", "b.png")),
            )
            .await
            .unwrap();

        let new_key = updated.photo.unwrap().key;
        assert_ne!(new_key, old_key);
        assert!(new_key.as_str().ends_with("b.png"));

        let orphans = service.pending_orphans().await;
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].key, old_key);
        assert_eq!(orphans[0].reason, OrphanReason::ReplacedPhoto);
        assert_eq!(orphans[0].item_id, Some(created.id));

        // storage recovers and the sweep clears the old object
        store.fail_delete.store(false, Ordering::SeqCst);
        let report = service.sweep_orphans().await;
        assert_eq!(report.removed, vec![old_key.clone()]);
        assert!(report.still_pending.is_empty());
        assert!(!store.inner.photo_exists(&old_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_save_after_replacement_tracks_new_upload() {
        let (service, store, repository) = setup();
        let created = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap();

        repository.fail_update.store(true, Ordering::SeqCst);
        let err = service
            .update_item(
                &created.id,
                UpdateItemRequest::default(),
                Some(png(b"NEW", "b.png")),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ItemError::Repository { operation: "update", .. }));
        let orphans = service.pending_orphans().await;
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].reason, OrphanReason::UnsavedReplacement);
        assert!(orphans[0].key.as_str().ends_with("b.png"));
        assert_eq!(store.puts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_save_onto_same_key_is_not_an_orphan() {
        let (service, store, repository) = setup();
        let created = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap();
        let current = created.photo.clone().unwrap();

        *store.fixed_key.lock().unwrap() = Some(current.key.clone());
        repository.fail_update.store(true, Ordering::SeqCst);
        let err = service
            .update_item(
                &created.id,
                UpdateItemRequest::default(),
                Some(png(b"NEW", "b.png")),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ItemError::Repository { operation: "update", .. }));
        // the stored record still references the overwritten object
        assert!(service.pending_orphans().await.is_empty());
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
        assert_eq!(
            service.get_item(&created.id).await.unwrap().photo,
            Some(current)
        );
    }

    #[tokio::test]
    async fn test_storage_failure_blocks_delete() {
        let (service, store, _) = setup();
        let created = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap();

        store.fail_delete.store(true, Ordering::SeqCst);
        let err = service.delete_item(&created.id).await.unwrap_err();
        assert!(matches!(err, ItemError::Storage { operation: "delete", .. }));

        // the record survives so the delete can be retried
        assert!(service.get_item(&created.id).await.is_ok());

        store.fail_delete.store(false, Ordering::SeqCst);
        service.delete_item(&created.id).await.unwrap();
        assert!(matches!(
            service.get_item(&created.id).await,
            Err(ItemError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_item_never_touches_storage() {
        let (service, store, _) = setup();

        let err = service.delete_item(&ItemId::generate()).await.unwrap_err();

        assert!(matches!(err, ItemError::NotFound { .. }));
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_tolerates_already_missing_photo() {
        let (service, store, _) = setup();
        let created = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap();

        store
            .inner
            .delete_photo(&created.photo.unwrap().key)
            .await
            .unwrap();

        service.delete_item(&created.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_key_prefix_applies_to_uploads() {
        let (service, _, _) = setup();
        let service = service.with_key_prefix("my_uploads");

        let created = service
            .create_item(mug(), Some(png(b"PNGDATA", "a.png")))
            .await
            .unwrap();

        let photo = created.photo.unwrap();
        assert!(photo.key.as_str().starts_with("my_uploads/"));
        assert!(photo.url.ends_with(photo.key.as_str()));
    }

    #[tokio::test]
    async fn test_upload_ticket_requires_signing_backend() {
        let (service, _, _) = setup();

        let err = service
            .create_upload_ticket("a.png", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ItemError::Storage {
                source: StorageError::UnsupportedOperation { .. },
                ..
            }
        ));

        let err = service.create_upload_ticket("", "image/png").await.unwrap_err();
        assert!(matches!(
            err,
            ItemError::Validation(ValidationError::MissingField("name"))
        ));
    }
}
