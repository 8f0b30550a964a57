use bytes::Bytes;

use crate::domain::value_objects::PhotoKey;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Photo bytes supplied by a caller for one create/update call
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub data: Bytes,
    pub content_type: String,
    pub file_name: String,
}

impl PhotoUpload {
    pub fn new(
        data: impl Into<Bytes>,
        content_type: Option<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            content_type: content_type
                .filter(|ct| !ct.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            file_name: file_name.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A photo object confirmed to exist in storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub url: String,
    pub key: PhotoKey,
}

/// Pre-signed direct upload target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub upload_url: String,
    pub file_url: String,
    pub file_key: PhotoKey,
}
