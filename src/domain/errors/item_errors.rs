use crate::domain::{
    errors::{RepositoryError, StorageError, ValidationError},
    value_objects::ItemId,
};

/// Failures surfaced by item lifecycle operations
#[derive(Debug, Clone)]
pub enum ItemError {
    /// Bad or missing input
    Validation(ValidationError),

    /// No item with this id
    NotFound { id: ItemId },

    /// Photo storage put/delete/sign failed
    Storage {
        operation: &'static str,
        key: Option<String>,
        source: StorageError,
    },

    /// Item persistence failed
    Repository {
        operation: &'static str,
        id: Option<ItemId>,
        source: RepositoryError,
    },
}

impl ItemError {
    pub fn storage(operation: &'static str, key: Option<String>, source: StorageError) -> Self {
        ItemError::Storage {
            operation,
            key,
            source,
        }
    }

    pub fn repository(
        operation: &'static str,
        id: Option<ItemId>,
        source: RepositoryError,
    ) -> Self {
        ItemError::Repository {
            operation,
            id,
            source,
        }
    }
}

impl From<ValidationError> for ItemError {
    fn from(err: ValidationError) -> Self {
        ItemError::Validation(err)
    }
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemError::Validation(err) => write!(f, "{}", err),
            ItemError::NotFound { .. } => write!(f, "Item not found"),
            ItemError::Storage {
                operation,
                key: Some(key),
                source,
            } => write!(f, "Photo {} failed for '{}': {}", operation, key, source),
            ItemError::Storage {
                operation, source, ..
            } => write!(f, "Photo {} failed: {}", operation, source),
            ItemError::Repository {
                operation,
                id: Some(id),
                source,
            } => write!(f, "Item {} failed for {}: {}", operation, id, source),
            ItemError::Repository {
                operation, source, ..
            } => write!(f, "Item {} failed: {}", operation, source),
        }
    }
}

impl std::error::Error for ItemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ItemError::Validation(err) => Some(err),
            ItemError::NotFound { .. } => None,
            ItemError::Storage { source, .. } => Some(source),
            ItemError::Repository { source, .. } => Some(source),
        }
    }
}

/// Result type for item lifecycle operations
pub type ItemResult<T> = Result<T, ItemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = ItemError::storage(
            "upload",
            Some("1700000000000-a.png".to_string()),
            StorageError::StorageBackendError {
                message: "timeout".to_string(),
            },
        );
        let message = err.to_string();
        assert!(message.contains("upload"));
        assert!(message.contains("1700000000000-a.png"));
        assert!(message.contains("timeout"));

        let err = ItemError::from(ValidationError::MissingField("price"));
        assert_eq!(err.to_string(), "Field 'price' is required");
    }
}
