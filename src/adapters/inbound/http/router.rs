use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    create_item, create_upload_url, delete_item, get_item, health, list_items, list_orphans, root,
    sweep_orphans, update_item,
};
use crate::{domain::models::policy::DEFAULT_MAX_PHOTO_BYTES, ports::services::ItemService};

/// Room left for the text fields and multipart framing around a photo
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Application state containing all services
#[derive(Clone)]
pub struct AppState {
    pub item_service: Arc<dyn ItemService>,
    /// Largest photo accepted before the body is rejected outright
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(item_service: Arc<dyn ItemService>) -> Self {
        Self {
            item_service,
            max_upload_bytes: DEFAULT_MAX_PHOTO_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(create_item_router())
        .merge(create_orphan_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        // Add state for dependency injection
        .with_state(state)
}

/// Create a router with just item operations
pub fn create_item_router() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/items/upload-url", get(create_upload_url))
        .route(
            "/api/items/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
}

/// Create a router with just orphan maintenance operations
pub fn create_orphan_router() -> Router<AppState> {
    Router::new()
        .route("/api/orphans", get(list_orphans))
        .route("/api/orphans/sweep", post(sweep_orphans))
}
