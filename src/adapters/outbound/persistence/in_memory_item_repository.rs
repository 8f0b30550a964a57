use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{RepositoryError, RepositoryResult},
        models::{Item, NewItem},
        value_objects::ItemId,
    },
    ports::repositories::ItemRepository,
};

/// In-memory implementation of ItemRepository for testing and development
#[derive(Clone, Default)]
pub struct InMemoryItemRepository {
    items: Arc<RwLock<HashMap<ItemId, Item>>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn insert(&self, item: NewItem) -> RepositoryResult<Item> {
        let now = Utc::now();
        let item = Item {
            id: ItemId::generate(),
            name: item.name,
            price: item.price,
            note: item.note,
            category: item.category,
            photo: item.photo,
            created_at: now,
            updated_at: now,
        };

        self.items.write().await.insert(item.id, item.clone());

        Ok(item)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Item>> {
        let items = self.items.read().await;

        let mut all: Vec<Item> = items.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(all)
    }

    async fn find_by_id(&self, id: &ItemId) -> RepositoryResult<Option<Item>> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn update(&self, item: &Item) -> RepositoryResult<Item> {
        let mut items = self.items.write().await;

        let stored = items
            .get_mut(&item.id)
            .ok_or(RepositoryError::NotFound { id: item.id })?;

        // Identity and creation time are owned by the repository
        stored.name = item.name.clone();
        stored.price = item.price;
        stored.note = item.note.clone();
        stored.category = item.category.clone();
        stored.photo = item.photo.clone();
        stored.updated_at = Utc::now().max(stored.updated_at);

        Ok(stored.clone())
    }

    async fn delete(&self, id: &ItemId) -> RepositoryResult<bool> {
        Ok(self.items.write().await.remove(id).is_some())
    }
}
