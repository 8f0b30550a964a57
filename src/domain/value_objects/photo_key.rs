use chrono::{DateTime, Utc};

use crate::domain::errors::ValidationError;

const MAX_KEY_LEN: usize = 1024;
const MAX_FILE_NAME_LEN: usize = 200;

/// A validated storage key for a photo object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoKey(String);

impl PhotoKey {
    /// Create a new PhotoKey with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyPhotoKey);
        }

        if value.len() > MAX_KEY_LEN {
            return Err(ValidationError::PhotoKeyTooLong {
                actual: value.len(),
                max: MAX_KEY_LEN,
            });
        }

        if value.contains('\0') {
            return Err(ValidationError::InvalidPhotoKeyCharacter('\0'));
        }

        if value.starts_with('/') {
            return Err(ValidationError::PhotoKeyStartsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::PhotoKeyContainsDoubleSlash);
        }

        Ok(Self(value))
    }

    /// Generate a fresh key for an upload: `[prefix/]{millis}-{sanitized file name}`
    pub fn generate(
        prefix: Option<&str>,
        original_file_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let file_name = sanitize_file_name(original_file_name);
        let base = format!("{}-{}", now.timestamp_millis(), file_name);

        let key = match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
            Some(prefix) => format!("{}/{}", prefix, base),
            None => base,
        };

        PhotoKey::new(key)
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the file name part of the key (everything after the last '/')
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }
}

impl std::fmt::Display for PhotoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reduce a client-supplied file name to a safe single key segment
fn sanitize_file_name(original: &str) -> String {
    let last = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let mut cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.len() > MAX_FILE_NAME_LEN {
        // only ASCII survives sanitizing, so byte truncation is safe
        cleaned.truncate(MAX_FILE_NAME_LEN);
    }

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
