use crate::domain::{
    errors::ValidationError,
    models::{CreateItemRequest, Item, PhotoUpload, UpdateItemRequest},
};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_NOTE_LEN: usize = 2000;
pub const MAX_CATEGORY_LEN: usize = 100;
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Which fields and payloads an item must carry
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPolicy {
    pub require_photo_on_create: bool,
    pub require_category: bool,
    pub max_photo_bytes: usize,
    /// Empty means any content type is accepted
    pub allowed_content_types: Vec<String>,
}

impl Default for ItemPolicy {
    fn default() -> Self {
        Self {
            require_photo_on_create: true,
            require_category: false,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            allowed_content_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "application/pdf".to_string(),
                "video/mp4".to_string(),
            ],
        }
    }
}

impl ItemPolicy {
    /// Accept everything the schema allows, with no photo requirement
    pub fn permissive() -> Self {
        Self {
            require_photo_on_create: false,
            require_category: false,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            allowed_content_types: Vec::new(),
        }
    }

    pub fn validate_create(
        &self,
        request: &CreateItemRequest,
        photo: Option<&PhotoUpload>,
    ) -> Result<(), ValidationError> {
        if request.price.is_none() {
            return Err(ValidationError::MissingField("price"));
        }

        check_len("name", request.name.as_deref(), MAX_NAME_LEN)?;
        check_len("note", request.note.as_deref(), MAX_NOTE_LEN)?;
        check_len("category", request.category.as_deref(), MAX_CATEGORY_LEN)?;

        if self.require_category && is_blank(request.category.as_deref()) {
            return Err(ValidationError::MissingField("category"));
        }

        match photo {
            Some(photo) => self.validate_photo(photo),
            None if self.require_photo_on_create => Err(ValidationError::PhotoRequired),
            None => Ok(()),
        }
    }

    pub fn validate_update(
        &self,
        current: &Item,
        changes: &UpdateItemRequest,
        photo: Option<&PhotoUpload>,
    ) -> Result<(), ValidationError> {
        check_len("name", changes.name.as_deref(), MAX_NAME_LEN)?;
        check_len("note", changes.note.as_deref(), MAX_NOTE_LEN)?;
        check_len("category", changes.category.as_deref(), MAX_CATEGORY_LEN)?;

        if self.require_category {
            let cleared = changes.category.as_deref().map(str::trim) == Some("");
            if cleared || (changes.category.is_none() && current.category.is_none()) {
                return Err(ValidationError::MissingField("category"));
            }
        }

        match photo {
            Some(photo) => self.validate_photo(photo),
            None => Ok(()),
        }
    }

    pub fn validate_photo(&self, photo: &PhotoUpload) -> Result<(), ValidationError> {
        if photo.is_empty() {
            return Err(ValidationError::EmptyPhoto);
        }

        if photo.len() > self.max_photo_bytes {
            return Err(ValidationError::PhotoTooLarge {
                actual: photo.len(),
                max: self.max_photo_bytes,
            });
        }

        self.validate_content_type(&photo.content_type)
    }

    /// Check a declared content type against the allow-list, ignoring parameters
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if self.allowed_content_types.is_empty() {
            return Ok(());
        }

        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if self.allowed_content_types.iter().any(|ct| *ct == essence) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            })
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn check_len(field: &'static str, value: Option<&str>, max: usize) -> Result<(), ValidationError> {
    match value.map(|v| v.chars().count()) {
        Some(actual) if actual > max => Err(ValidationError::FieldTooLong { field, actual, max }),
        _ => Ok(()),
    }
}
