use crate::domain::errors::StorageError;
use thiserror::Error as ThisError;

/// Infrastructure errors raised inside the storage adapters
#[derive(ThisError, Debug)]
pub enum StoreError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Cloudinary error: {status} - {message}")]
    Cloudinary { status: u16, message: String },

    #[error("Invalid storage configuration: {0}")]
    Config(String),
}

/// Convert object_store errors to domain storage errors
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::ObjectNotFound { key: path },
            object_store::Error::PermissionDenied { path, .. }
            | object_store::Error::Unauthenticated { path, .. } => StorageError::AccessDenied {
                key: path,
                operation: "object storage".to_string(),
            },
            object_store::Error::NotSupported { .. } | object_store::Error::NotImplemented => {
                StorageError::UnsupportedOperation {
                    operation: "object storage".to_string(),
                    reason: err.to_string(),
                }
            }
            _ => StorageError::InfrastructureError {
                message: format!("Object store operation failed: {}", err),
                source: Some(err.to_string()),
            },
        }
    }
}

/// Convert infrastructure StoreError to domain StorageError
impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ObjectStore(object_err) => object_err.into(),
            StoreError::Cloudinary { status, message } if status == 401 || status == 403 => {
                StorageError::AccessDenied {
                    key: String::new(),
                    operation: message,
                }
            }
            StoreError::Cloudinary { message, .. } => StorageError::StorageBackendError { message },
            StoreError::Transport(e) => StorageError::InfrastructureError {
                message: format!("Storage request failed: {}", e),
                source: Some(e.to_string()),
            },
            StoreError::Config(message) => StorageError::ValidationError { message },
        }
    }
}
