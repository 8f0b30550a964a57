pub mod health_handlers;
pub mod item_handlers;
pub mod orphan_handlers;

pub use health_handlers::*;
pub use item_handlers::*;
pub use orphan_handlers::*;

use axum::{http::StatusCode, Json};

use crate::{adapters::inbound::http::dto::ErrorResponseDto, domain::errors::ItemError};

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponseDto>);

pub(crate) fn item_error(error: ItemError) -> ApiError {
    let status_code = StatusCode::from(&error);
    (status_code, Json(ErrorResponseDto::from_item_error(&error)))
}
