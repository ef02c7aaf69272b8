//! Image upload contract.
//!
//! # Responsibility
//! - Describe an uploaded image independently of the HTTP multipart layer.
//! - Define the storage seam that turns an upload into a public URL.
//!
//! # Invariants
//! - Uploads larger than `MAX_IMAGE_BYTES` are rejected before storage.
//! - Only `image/*` content types are stored.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod local;

pub use local::LocalImageStore;

/// Largest accepted image payload (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub type ImageResult<T> = Result<T, ImageError>;

/// Image payload extracted from a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client-side file name, as sent.
    pub file_name: String,
    /// MIME type declared by the client.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Checks size and content type limits.
    pub fn validate(&self) -> ImageResult<()> {
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge {
                size: self.bytes.len(),
                max: MAX_IMAGE_BYTES,
            });
        }
        if !self.content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(ImageError::UnsupportedContentType(
                self.content_type.clone(),
            ));
        }
        Ok(())
    }
}

/// Error raised while validating or storing an image.
#[derive(Debug)]
pub enum ImageError {
    TooLarge { size: usize, max: usize },
    UnsupportedContentType(String),
    Io(std::io::Error),
}

impl ImageError {
    /// Whether the caller sent something unacceptable, as opposed to a
    /// storage failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::TooLarge { .. } | Self::UnsupportedContentType(_)
        )
    }
}

impl Display for ImageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLarge { size, max } => {
                write!(f, "image is {size} bytes; the limit is {max} bytes")
            }
            Self::UnsupportedContentType(value) => {
                write!(f, "unsupported image content type `{value}`")
            }
            Self::Io(err) => write!(f, "failed to store image: {err}"),
        }
    }
}

impl Error for ImageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Storage backend for uploaded images.
pub trait ImageStore: Send + Sync {
    /// Persists `upload` and returns the URL it is publicly reachable at.
    fn upload(&self, upload: &ImageUpload) -> ImageResult<String>;
}

/// Stores `upload` when present and returns its public URL.
///
/// This is the pre-processing step run before a record is created or updated.
pub fn store_optional_image<S: ImageStore + ?Sized>(
    store: &S,
    upload: Option<&ImageUpload>,
) -> ImageResult<Option<String>> {
    match upload {
        Some(upload) => store.upload(upload).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageError, ImageUpload, MAX_IMAGE_BYTES};

    fn upload(content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            file_name: "photo.png".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn validate_accepts_images_within_limit() {
        upload("image/png", 16).validate().unwrap();
        upload("IMAGE/JPEG", MAX_IMAGE_BYTES).validate().unwrap();
    }

    #[test]
    fn validate_rejects_oversized_and_non_image_payloads() {
        let err = upload("image/png", MAX_IMAGE_BYTES + 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { .. }));
        assert!(err.is_client_error());

        let err = upload("text/plain", 4).validate().unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedContentType(_)));
    }
}
