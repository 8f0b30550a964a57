use async_trait::async_trait;

use crate::domain::{
    errors::ItemResult,
    models::{
        CreateItemRequest, Item, OrphanedPhoto, PhotoUpload, SweepReport, UpdateItemRequest,
        UploadTicket,
    },
    value_objects::ItemId,
};

/// Port for the item-photo lifecycle.
/// Keeps item records and their stored photos consistent across
/// create, update and delete.
#[async_trait]
pub trait ItemService: Send + Sync + 'static {
    /// Create an item, uploading its photo first when one is given
    async fn create_item(
        &self,
        request: CreateItemRequest,
        photo: Option<PhotoUpload>,
    ) -> ItemResult<Item>;

    /// All items, newest first
    async fn list_items(&self) -> ItemResult<Vec<Item>>;

    /// A single item
    async fn get_item(&self, id: &ItemId) -> ItemResult<Item>;

    /// Apply a partial update, replacing the photo when one is given
    async fn update_item(
        &self,
        id: &ItemId,
        changes: UpdateItemRequest,
        photo: Option<PhotoUpload>,
    ) -> ItemResult<Item>;

    /// Delete the photo object, then the item record
    async fn delete_item(&self, id: &ItemId) -> ItemResult<()>;

    /// Pre-signed direct upload target for the legacy upload flow
    async fn create_upload_ticket(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> ItemResult<UploadTicket>;

    /// Objects known to be orphaned, oldest first
    async fn pending_orphans(&self) -> Vec<OrphanedPhoto>;

    /// Retry deletion of every known orphan
    async fn sweep_orphans(&self) -> SweepReport;
}
