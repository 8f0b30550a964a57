use axum::Router;
use std::sync::Arc;
use tracing::info;

use crate::{
    adapters::{
        inbound::http::{create_router, AppState},
        outbound::{
            persistence::{InMemoryItemRepository, SqlItemRepository},
            storage::{
                create_s3_photo_store, CloudinaryConfig, CloudinaryPhotoStore,
                ObjectStorePhotoStore, S3Config,
            },
        },
    },
    domain::models::ItemPolicy,
    ports::{repositories::ItemRepository, services::ItemService, storage::PhotoStore},
    services::ItemServiceImpl,
};

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub repository_backend: RepositoryBackend,
    pub policy: ItemPolicy,
    /// Folder new photo keys are placed under
    pub photo_key_prefix: Option<String>,
}

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory { public_base_url: Option<String> },
    S3(S3Config),
    Cloudinary(CloudinaryConfig),
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::InMemory {
            public_base_url: None,
        }
    }
}

/// Repository backend configuration
#[derive(Debug, Clone, Default)]
pub enum RepositoryBackend {
    #[default]
    InMemory,
    Database { connection_string: String },
}

/// Application dependencies container
pub struct AppDependencies {
    pub photo_store: Arc<dyn PhotoStore>,
    pub item_repository: Arc<dyn ItemRepository>,
}

/// Application services container
pub struct AppServices {
    pub item_service: Arc<dyn ItemService>,
    pub max_upload_bytes: usize,
}

impl AppServices {
    /// HTTP router serving these services
    pub fn router(&self) -> Router {
        create_router(
            AppState::new(self.item_service.clone()).with_max_upload_bytes(self.max_upload_bytes),
        )
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Configure repository backend
    pub fn with_repository_backend(mut self, backend: RepositoryBackend) -> Self {
        self.config.repository_backend = backend;
        self
    }

    pub fn with_policy(mut self, policy: ItemPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Build the application dependencies
    pub async fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        let photo_store = self.create_photo_store()?;
        let item_repository = self.create_repository().await?;

        Ok(AppDependencies {
            photo_store,
            item_repository,
        })
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let deps = self.build_dependencies().await?;

        let mut item_service = ItemServiceImpl::new(
            deps.item_repository,
            deps.photo_store,
            self.config.policy.clone(),
        );
        if let Some(prefix) = &self.config.photo_key_prefix {
            item_service = item_service.with_key_prefix(prefix.clone());
        }

        Ok(AppServices {
            item_service: Arc::new(item_service),
            max_upload_bytes: self.config.policy.max_photo_bytes,
        })
    }

    /// Create the photo store based on configuration
    fn create_photo_store(&self) -> Result<Arc<dyn PhotoStore>, AppError> {
        match &self.config.storage_backend {
            StorageBackend::InMemory { public_base_url } => {
                let store = match public_base_url {
                    Some(url) => ObjectStorePhotoStore::new(
                        Arc::new(object_store::memory::InMemory::new()),
                        url.clone(),
                    ),
                    None => ObjectStorePhotoStore::in_memory(),
                };
                info!("Using in-memory photo storage");
                Ok(Arc::new(store))
            }
            StorageBackend::S3(config) => {
                let store =
                    create_s3_photo_store(config).map_err(|e| AppError::StorageInit {
                        message: format!("{:#}", e),
                    })?;
                info!(bucket = %config.bucket, region = %config.region, "Using S3 photo storage");
                Ok(Arc::new(store))
            }
            StorageBackend::Cloudinary(config) => {
                info!(cloud_name = %config.cloud_name, "Using Cloudinary photo storage");
                Ok(Arc::new(CloudinaryPhotoStore::new(config.clone())))
            }
        }
    }

    /// Create the item repository based on configuration
    async fn create_repository(&self) -> Result<Arc<dyn ItemRepository>, AppError> {
        match &self.config.repository_backend {
            RepositoryBackend::InMemory => {
                info!("Using in-memory item repository");
                Ok(Arc::new(InMemoryItemRepository::new()))
            }
            RepositoryBackend::Database { connection_string } => {
                let repository = SqlItemRepository::connect(connection_string)
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to connect to database: {}", e),
                    })?;
                repository
                    .migrate()
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to migrate database: {}", e),
                    })?;
                info!("Using PostgreSQL item repository");
                Ok(Arc::new(repository))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },

    #[error("Repository initialization error: {message}")]
    RepositoryInit { message: String },
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::default())
        .with_repository_backend(RepositoryBackend::InMemory)
        .build()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_create_in_memory_app() {
        let app = create_in_memory_app().await.unwrap();

        assert!(app.item_service.list_items().await.unwrap().is_empty());
        assert!(app.item_service.pending_orphans().await.is_empty());
    }

    #[tokio::test]
    async fn test_app_builder_serves_router() {
        let app = AppBuilder::new()
            .with_policy(ItemPolicy::permissive())
            .build()
            .await
            .unwrap();

        let server = TestServer::new(app.router()).unwrap();
        server.get("/api/items").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_s3_backend_builds_without_network() {
        let deps = AppBuilder::new()
            .with_storage_backend(StorageBackend::S3(S3Config::new("photos", "us-east-1")))
            .build_dependencies()
            .await
            .unwrap();

        assert_eq!(
            deps.photo_store
                .public_url(&crate::domain::value_objects::PhotoKey::new("1-a.png".to_string()).unwrap()),
            "https://photos.s3.us-east-1.amazonaws.com/1-a.png"
        );
    }
}
