use crate::domain::value_objects::ItemId;

/// Errors reported by the item repository
#[derive(Debug, Clone)]
pub enum RepositoryError {
    /// The record disappeared between read and write
    NotFound { id: ItemId },

    /// Stored data could not be mapped back to an item
    CorruptRecord { id: String, reason: String },

    /// Database or driver failure
    Database {
        message: String,
        source: Option<String>,
    },
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::NotFound { id } => write!(f, "Item record not found: {}", id),
            RepositoryError::CorruptRecord { id, reason } => {
                write!(f, "Corrupt item record '{}': {}", id, reason)
            }
            RepositoryError::Database { message, .. } => {
                write!(f, "Database error: {}", message)
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
