use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use super::{item_error, ApiError};
use crate::{
    adapters::inbound::http::{
        dto::{ErrorResponseDto, ItemDto, SuccessResponseDto, UploadTicketDto, UploadUrlQueryDto},
        form::ItemForm,
        router::AppState,
    },
    domain::value_objects::ItemId,
};

/// Malformed ids can never match an item, so they read as not found
fn parse_item_id(id: &str) -> Result<ItemId, ApiError> {
    id.parse().map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponseDto::not_found("Item not found")),
        )
    })
}

async fn read_form(multipart: Multipart) -> Result<ItemForm, ApiError> {
    ItemForm::from_multipart(multipart).await.map_err(|e| {
        warn!(error = %e.message, status = %e.status, "Rejected multipart body");
        let body = if e.status == StatusCode::PAYLOAD_TOO_LARGE {
            ErrorResponseDto::payload_too_large(&e.message)
        } else {
            ErrorResponseDto::bad_request(&e.message)
        };
        (e.status, Json(body))
    })
}

/// Handle item creation from a multipart form
pub async fn create_item(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ItemDto>), ApiError> {
    let form = read_form(multipart).await?;
    let (request, photo) = form
        .into_create_request()
        .map_err(|e| item_error(e.into()))?;

    let item = app_state
        .item_service
        .create_item(request, photo)
        .await
        .map_err(item_error)?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Handle item listing, newest first
pub async fn list_items(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ItemDto>>, ApiError> {
    let items = app_state
        .item_service
        .list_items()
        .await
        .map_err(item_error)?;

    Ok(Json(items.into_iter().map(ItemDto::from).collect()))
}

pub async fn get_item(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemDto>, ApiError> {
    let id = parse_item_id(&id)?;

    let item = app_state
        .item_service
        .get_item(&id)
        .await
        .map_err(item_error)?;

    Ok(Json(item.into()))
}

/// Handle partial item updates, optionally replacing the photo
pub async fn update_item(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ItemDto>, ApiError> {
    let id = parse_item_id(&id)?;
    let form = read_form(multipart).await?;
    let (changes, photo) = form
        .into_update_request()
        .map_err(|e| item_error(e.into()))?;

    let item = app_state
        .item_service
        .update_item(&id, changes, photo)
        .await
        .map_err(item_error)?;

    Ok(Json(item.into()))
}

/// Handle item deletion together with its photo
pub async fn delete_item(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponseDto>, ApiError> {
    let id = parse_item_id(&id)?;

    app_state
        .item_service
        .delete_item(&id)
        .await
        .map_err(item_error)?;

    Ok(Json(SuccessResponseDto::new("Item deleted successfully")))
}

/// Issue a pre-signed URL for a direct browser upload
pub async fn create_upload_url(
    State(app_state): State<AppState>,
    Query(query): Query<UploadUrlQueryDto>,
) -> Result<Json<UploadTicketDto>, ApiError> {
    let ticket = app_state
        .item_service
        .create_upload_ticket(
            query.name.as_deref().unwrap_or_default(),
            query.content_type.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(item_error)?;

    Ok(Json(ticket.into()))
}
