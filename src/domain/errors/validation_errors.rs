/// Validation errors for domain value objects and item input
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // PhotoKey validation errors
    EmptyPhotoKey,
    PhotoKeyTooLong {
        actual: usize,
        max: usize,
    },
    InvalidPhotoKeyCharacter(char),
    PhotoKeyStartsWithSlash,
    PhotoKeyContainsDoubleSlash,

    // ItemId validation errors
    InvalidItemId(String),

    // Price validation errors
    InvalidPrice(String),
    NegativePrice(f64),

    // Item field validation errors
    MissingField(&'static str),
    FieldTooLong {
        field: &'static str,
        actual: usize,
        max: usize,
    },

    // Photo payload validation errors
    PhotoRequired,
    EmptyPhoto,
    PhotoTooLarge {
        actual: usize,
        max: usize,
    },
    UnsupportedContentType {
        content_type: String,
        allowed: Vec<String>,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // PhotoKey errors
            ValidationError::EmptyPhotoKey => write!(f, "Photo key cannot be empty"),
            ValidationError::PhotoKeyTooLong { actual, max } => {
                write!(f, "Photo key too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidPhotoKeyCharacter(c) => {
                write!(f, "Invalid character in photo key: {:?}", c)
            }
            ValidationError::PhotoKeyStartsWithSlash => {
                write!(f, "Photo key cannot start with '/'")
            }
            ValidationError::PhotoKeyContainsDoubleSlash => {
                write!(f, "Photo key cannot contain '//'")
            }

            ValidationError::InvalidItemId(value) => {
                write!(f, "Invalid item id: '{}'", value)
            }

            ValidationError::InvalidPrice(value) => {
                write!(f, "Price must be a number, got '{}'", value)
            }
            ValidationError::NegativePrice(value) => {
                write!(f, "Price cannot be negative: {}", value)
            }

            ValidationError::MissingField(field) => {
                write!(f, "Field '{}' is required", field)
            }
            ValidationError::FieldTooLong { field, actual, max } => {
                write!(
                    f,
                    "Field '{}' too long: {} characters (max: {})",
                    field, actual, max
                )
            }

            ValidationError::PhotoRequired => write!(f, "A photo is required"),
            ValidationError::EmptyPhoto => write!(f, "Uploaded photo is empty"),
            ValidationError::PhotoTooLarge { actual, max } => {
                write!(f, "Photo too large: {} bytes (max: {})", actual, max)
            }
            ValidationError::UnsupportedContentType {
                content_type,
                allowed,
            } => {
                write!(
                    f,
                    "Unsupported photo content type '{}' (allowed: {})",
                    content_type,
                    allowed.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
