pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Models
    CreateItemRequest,
    // Errors
    ItemError,
    // Value objects
    ItemId,
    Item,
    ItemPolicy,
    OrphanReason,
    OrphanedPhoto,
    PhotoKey,
    PhotoUpload,
    Price,
    RepositoryError,
    StorageError,
    StoredPhoto,
    SweepReport,
    UpdateItemRequest,
    UploadTicket,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{ItemRepository, ItemService, PhotoStore};

// Service implementations - business logic
pub use services::{ItemServiceImpl, OrphanLedger};

// Application factory and configuration
pub use app::{
    create_in_memory_app, AppBuilder, AppConfig, AppDependencies, AppError, AppServices,
    RepositoryBackend, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    persistence::{InMemoryItemRepository, SqlItemRepository},
    storage::{CloudinaryConfig, CloudinaryPhotoStore, ObjectStorePhotoStore, S3Config},
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, AppBuilder, AppServices, CreateItemRequest, InMemoryItemRepository,
        ItemId, ItemPolicy, ItemRepository, ItemService, ItemServiceImpl, ObjectStorePhotoStore,
        PhotoStore, PhotoUpload, Price, UpdateItemRequest,
    };
}
