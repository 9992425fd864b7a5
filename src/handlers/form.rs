//! Multipart form decoding shared by the user and registration endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::{ApiError, validation_error};
use crate::storage::{ImageUpload, MAX_IMAGE_BYTES};

/// Name of the file field carrying a user photo.
pub const PHOTO_FIELD: &str = "photo";

/// Text fields and the optional photo of a submitted form
#[derive(Debug, Default)]
pub struct UserForm {
    fields: HashMap<String, String>,
    pub photo: Option<ImageUpload>,
}

impl UserForm {
    /// Reads every part of `multipart`. An empty file input counts as no photo.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UserForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == PHOTO_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                if bytes.len() > MAX_IMAGE_BYTES {
                    return Err(validation_error(
                        "Invalid form data.",
                        format!("photo exceeds {MAX_IMAGE_BYTES} bytes"),
                    ));
                }
                if bytes.is_empty() && file_name.as_deref().unwrap_or("").is_empty() {
                    continue;
                }

                form.photo = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Text value of `name`, if submitted.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Text value of `name`, or an empty string.
    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default()
    }
}
