//! Multipart form extraction for the HTML add/edit pages.
//!
//! The image part is pulled out as an explicit `ImageUpload` so handlers can
//! store it before the record is saved; every other part becomes a text field.

use crate::error::ApiError;
use bytes::BufMut;
use futures_util::TryStreamExt;
use roster_core::{Fields, ImageUpload, Record};
use serde_json::Value;
use warp::multipart::{FormData, Part};

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// Upper bound for a whole form submission, image included.
pub const MAX_FORM_BYTES: u64 = 6 * 1024 * 1024;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Parsed add/edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub record: Record,
    /// `None` when no file was chosen.
    pub image: Option<ImageUpload>,
}

/// Reads every part of `form`.
///
/// # Errors
/// - `BadRequest` when the body is not valid multipart or a text field is
///   not UTF-8.
pub async fn read_form(mut form: FormData) -> Result<FormSubmission, ApiError> {
    let mut fields = Fields::new();
    let mut image = None;

    // Each part must be drained before the next one is polled.
    while let Some(part) = form
        .try_next()
        .await
        .map_err(|err| ApiError::BadRequest(format!("malformed multipart form: {err}")))?
    {
        let name = part.name().to_string();

        if name == IMAGE_FIELD {
            let file_name = part.filename().unwrap_or_default().to_string();
            let content_type = part
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string();
            let bytes = read_part(part).await?;
            // Browsers send an empty, unnamed part when no file was chosen.
            if file_name.is_empty() || bytes.is_empty() {
                continue;
            }
            image = Some(ImageUpload {
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        let bytes = read_part(part).await?;
        let value = String::from_utf8(bytes)
            .map_err(|_| ApiError::BadRequest(format!("field `{name}` is not valid UTF-8")))?;
        fields.insert(name, Value::String(value));
    }

    let record = serde_json::from_value::<Record>(Value::Object(fields))
        .map_err(|err| ApiError::BadRequest(format!("invalid form fields: {err}")))?;

    Ok(FormSubmission { record, image })
}

async fn read_part(part: Part) -> Result<Vec<u8>, ApiError> {
    part.stream()
        .try_fold(Vec::new(), |mut buffer, chunk| {
            buffer.put(chunk);
            async move { Ok(buffer) }
        })
        .await
        .map_err(|err| ApiError::BadRequest(format!("failed to read form part: {err}")))
}
