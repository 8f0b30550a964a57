use async_trait::async_trait;

use crate::domain::{
    errors::RepositoryResult,
    models::{Item, NewItem},
    value_objects::ItemId,
};

/// Repository owning the durable representation of items
/// This trait handles item records only, never photo bytes
#[async_trait]
pub trait ItemRepository: Send + Sync + 'static {
    /// Insert a new item, assigning its id and timestamps
    async fn insert(&self, item: NewItem) -> RepositoryResult<Item>;

    /// All items, newest first (ties broken by id, descending)
    async fn find_all(&self) -> RepositoryResult<Vec<Item>>;

    /// Find a single item
    async fn find_by_id(&self, id: &ItemId) -> RepositoryResult<Option<Item>>;

    /// Save the mutable fields of an existing item and bump `updated_at`.
    ///
    /// Fails with `RepositoryError::NotFound` when the record no longer exists.
    async fn update(&self, item: &Item) -> RepositoryResult<Item>;

    /// Delete an item, returning whether a record was removed
    async fn delete(&self, id: &ItemId) -> RepositoryResult<bool>;
}
