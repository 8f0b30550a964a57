use chrono::{DateTime, Utc};

use crate::domain::{
    models::StoredPhoto,
    value_objects::{ItemId, Price},
};

/// A persisted item: user metadata plus a reference to its current photo
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub note: String,
    pub category: Option<String>,
    /// Set only by the lifecycle coordinator from a successful upload
    pub photo: Option<StoredPhoto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated item that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub price: Price,
    pub note: String,
    pub category: Option<String>,
    pub photo: Option<StoredPhoto>,
}

/// Request to create an item
#[derive(Debug, Clone, Default)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub note: Option<String>,
    pub category: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub note: Option<String>,
    pub category: Option<String>,
}

impl UpdateItemRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.note.is_none() && self.category.is_none()
    }

    /// Apply the provided fields onto an item
    pub fn apply_to(self, item: &mut Item) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(note) = self.note {
            item.note = note;
        }
        if let Some(category) = self.category {
            item.category = Some(category).filter(|c| !c.trim().is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PhotoKey;

    fn sample_item() -> Item {
        let now = Utc::now();
        Item {
            id: ItemId::generate(),
            name: "Mug".to_string(),
            price: Price::new(10.0).unwrap(),
            note: "blue".to_string(),
            category: Some("kitchen".to_string()),
            photo: Some(StoredPhoto {
                url: "memory://photos/1-a.png".to_string(),
                key: PhotoKey::new("1-a.png".to_string()).unwrap(),
            }),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut item = sample_item();
        let before = item.clone();

        let changes = UpdateItemRequest::default();
        assert!(changes.is_empty());
        changes.apply_to(&mut item);

        assert_eq!(item, before);
    }

    #[test]
    fn test_partial_update_only_touches_provided_fields() {
        let mut item = sample_item();

        UpdateItemRequest {
            price: Some(Price::new(12.0).unwrap()),
            note: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&mut item);

        assert_eq!(item.price.value(), 12.0);
        assert_eq!(item.note, "");
        assert_eq!(item.name, "Mug");
        assert_eq!(item.category.as_deref(), Some("kitchen"));
        assert!(item.photo.is_some());
    }

    #[test]
    fn test_empty_category_clears_it() {
        let mut item = sample_item();

        UpdateItemRequest {
            category: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&mut item);

        assert_eq!(item.category, None);
    }

    #[test]
    fn test_blank_category_clears_it() {
        let mut item = sample_item();

        UpdateItemRequest {
            category: Some("   ".to_string()),
            ..Default::default()
        }
        .apply_to(&mut item);

        assert_eq!(item.category, None);
    }
}
