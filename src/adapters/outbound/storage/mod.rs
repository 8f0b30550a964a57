// Infrastructure error types
pub mod error;

// Storage implementations
pub mod object_store_photo_store;

// Provider-specific implementations
pub mod cloudinary;
pub mod s3;

// Re-export key types
pub use cloudinary::{CloudinaryConfig, CloudinaryPhotoStore};
pub use error::StoreError;
pub use object_store_photo_store::ObjectStorePhotoStore;
pub use s3::{create_s3_photo_store, S3Config};
