use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{
    errors::{ItemError, StorageError},
    models::{Item, OrphanedPhoto, SweepReport, UploadTicket},
};

/// DTO for item responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub note: String,
    pub category: Option<String>,
    pub photo_url: Option<String>,
    pub photo_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query for a pre-signed upload URL
#[derive(Debug, Clone, Deserialize)]
pub struct UploadUrlQueryDto {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

/// DTO for upload ticket responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicketDto {
    pub upload_url: String,
    pub file_url: String,
    pub file_key: String,
}

/// DTO for a pending orphaned photo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanDto {
    pub key: String,
    pub reason: String,
    pub item_id: Option<String>,
    pub detected_at: DateTime<Utc>,
    pub attempts: u32,
    pub last_error: String,
}

/// DTO for orphan sweep results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReportDto {
    pub removed: Vec<String>,
    pub still_pending: Vec<String>,
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    pub timestamp: DateTime<Utc>,
}

/// DTO for success responses
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponseDto {
    pub message: String,
}

// Conversion implementations

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        let (photo_url, photo_key) = match item.photo {
            Some(photo) => (Some(photo.url), Some(photo.key.to_string())),
            None => (None, None),
        };

        ItemDto {
            id: item.id.to_string(),
            name: item.name,
            price: item.price.value(),
            note: item.note,
            category: item.category,
            photo_url,
            photo_key,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<UploadTicket> for UploadTicketDto {
    fn from(ticket: UploadTicket) -> Self {
        UploadTicketDto {
            upload_url: ticket.upload_url,
            file_url: ticket.file_url,
            file_key: ticket.file_key.to_string(),
        }
    }
}

impl From<OrphanedPhoto> for OrphanDto {
    fn from(orphan: OrphanedPhoto) -> Self {
        OrphanDto {
            key: orphan.key.to_string(),
            reason: orphan.reason.to_string(),
            item_id: orphan.item_id.map(|id| id.to_string()),
            detected_at: orphan.detected_at,
            attempts: orphan.attempts,
            last_error: orphan.last_error,
        }
    }
}

impl From<SweepReport> for SweepReportDto {
    fn from(report: SweepReport) -> Self {
        SweepReportDto {
            removed: report.removed.into_iter().map(|k| k.to_string()).collect(),
            still_pending: report
                .still_pending
                .into_iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl From<&ItemError> for StatusCode {
    fn from(error: &ItemError) -> Self {
        match error {
            ItemError::Validation(_) => StatusCode::BAD_REQUEST,
            ItemError::NotFound { .. } => StatusCode::NOT_FOUND,
            ItemError::Storage {
                source: StorageError::UnsupportedOperation { .. },
                ..
            } => StatusCode::NOT_IMPLEMENTED,
            ItemError::Storage { .. } | ItemError::Repository { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ErrorResponseDto {
    pub fn from_item_error(error: &ItemError) -> Self {
        let mut details = HashMap::new();

        let kind = match error {
            ItemError::Validation(_) => "ValidationError",
            ItemError::NotFound { id } => {
                details.insert(
                    "id".to_string(),
                    serde_json::Value::String(id.to_string()),
                );
                "NotFound"
            }
            ItemError::Storage { operation, key, .. } => {
                details.insert(
                    "operation".to_string(),
                    serde_json::Value::String(operation.to_string()),
                );
                if let Some(key) = key {
                    details.insert("key".to_string(), serde_json::Value::String(key.clone()));
                }
                "StorageError"
            }
            ItemError::Repository { operation, id, .. } => {
                details.insert(
                    "operation".to_string(),
                    serde_json::Value::String(operation.to_string()),
                );
                if let Some(id) = id {
                    details.insert("id".to_string(), serde_json::Value::String(id.to_string()));
                }
                "RepositoryError"
            }
        };

        ErrorResponseDto {
            error: error.to_string(),
            kind: kind.to_string(),
            details: if details.is_empty() {
                None
            } else {
                Some(details)
            },
            timestamp: Utc::now(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        ErrorResponseDto {
            error: message.to_string(),
            kind: "BadRequest".to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn payload_too_large(message: &str) -> Self {
        ErrorResponseDto {
            error: message.to_string(),
            kind: "PayloadTooLarge".to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        ErrorResponseDto {
            error: message.to_string(),
            kind: "NotFound".to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }
}

impl SuccessResponseDto {
    pub fn new(message: &str) -> Self {
        SuccessResponseDto {
            message: message.to_string(),
        }
    }
}
