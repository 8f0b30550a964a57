use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
};

use crate::domain::{
    errors::ValidationError,
    models::{CreateItemRequest, PhotoUpload, UpdateItemRequest},
    value_objects::Price,
};

/// File name used when a file part does not carry one
const FALLBACK_FILE_NAME: &str = "upload";

/// A multipart body that could not be read
#[derive(Debug)]
pub struct FormError {
    /// 413 when the body went over the upload limit, 400 otherwise
    pub status: StatusCode,
    pub message: String,
}

impl FormError {
    fn multipart(context: impl std::fmt::Display, error: MultipartError) -> Self {
        Self {
            status: error.status(),
            message: format!("{}: {}", context, error.body_text()),
        }
    }
}

/// Multipart item form as sent by the item endpoints.
///
/// Text fields: `name`, `price`, `note`, `category`. The photo comes from
/// the `photo` part, falling back to `file`.
#[derive(Debug, Default)]
pub struct ItemForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub note: Option<String>,
    pub category: Option<String>,
    photo: Option<PhotoUpload>,
    file: Option<PhotoUpload>,
}

impl ItemForm {
    /// Read every part of a multipart body
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, FormError> {
        let mut form = ItemForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormError::multipart("Invalid multipart body", e))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "photo" | "file" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| FormError::multipart(format!("Could not read '{}'", name), e))?;

                    // Browsers send an empty nameless part when no file was chosen
                    if data.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                        continue;
                    }

                    let upload = PhotoUpload::new(
                        data,
                        content_type,
                        file_name
                            .filter(|n| !n.is_empty())
                            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string()),
                    );

                    if name == "photo" {
                        form.photo = Some(upload);
                    } else {
                        form.file = Some(upload);
                    }
                }
                "name" | "price" | "note" | "category" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| FormError::multipart(format!("Could not read '{}'", name), e))?;

                    match name.as_str() {
                        "name" => form.name = Some(value),
                        "price" => form.price = Some(value),
                        "note" => form.note = Some(value),
                        _ => form.category = Some(value),
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn parse_price(&self) -> Result<Option<Price>, ValidationError> {
        self.price.as_deref().map(str::parse).transpose()
    }

    fn take_photo(&mut self) -> Option<PhotoUpload> {
        self.photo.take().or_else(|| self.file.take())
    }

    pub fn into_create_request(
        mut self,
    ) -> Result<(CreateItemRequest, Option<PhotoUpload>), ValidationError> {
        let price = self.parse_price()?;
        let photo = self.take_photo();

        let request = CreateItemRequest {
            name: self.name,
            price,
            note: self.note,
            category: self.category,
        };

        Ok((request, photo))
    }

    pub fn into_update_request(
        mut self,
    ) -> Result<(UpdateItemRequest, Option<PhotoUpload>), ValidationError> {
        let price = self.parse_price()?;
        let photo = self.take_photo();

        let request = UpdateItemRequest {
            name: self.name,
            price,
            note: self.note,
            category: self.category,
        };

        Ok((request, photo))
    }
}
