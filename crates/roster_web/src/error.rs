//! HTTP error mapping.
//!
//! # Responsibility
//! - Translate core errors into request-level failures.
//! - Turn every warp rejection into a plain-text response.
//!
//! # Invariants
//! - Missing records are always reported as `404`.
//! - Server-side failures are logged before the response is sent.

use log::{error, warn};
use roster_core::{ImageError, RepoError};
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter};
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{
    InvalidHeader, InvalidQuery, LengthRequired, MethodNotAllowed, MissingHeader,
    PayloadTooLarge, Reject, UnsupportedMediaType,
};
use warp::{Rejection, Reply};

/// Request-level failure raised by handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(message) | Self::BadRequest(message) | Self::Internal(message) => {
                f.write_str(message)
            }
        }
    }
}

impl Error for ApiError {}

impl Reject for ApiError {}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { .. } => Self::NotFound(value.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(value: ImageError) -> Self {
        if value.is_client_error() {
            Self::BadRequest(value.to_string())
        } else {
            Self::Internal(value.to_string())
        }
    }
}

/// Converts any rejection into a status code and a short text body.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status(), api_error.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(body_error) = err.find::<BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, body_error.to_string())
    } else if let Some(query_error) = err.find::<InvalidQuery>() {
        (StatusCode::BAD_REQUEST, query_error.to_string())
    } else if let Some(header_error) = err.find::<MissingHeader>() {
        (StatusCode::BAD_REQUEST, header_error.to_string())
    } else if let Some(header_error) = err.find::<InvalidHeader>() {
        (StatusCode::BAD_REQUEST, header_error.to_string())
    } else if err.find::<PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large".to_string())
    } else if err.find::<LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Length Required".to_string())
    } else if err.find::<UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported Media Type".to_string(),
        )
    } else if err.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled rejection: {err:?}"),
        )
    };

    if status.is_server_error() {
        error!(
            "event=http_error module=web status=error code={} error={message}",
            status.as_u16()
        );
    } else if status != StatusCode::NOT_FOUND {
        warn!(
            "event=http_reject module=web status=rejected code={} error={message}",
            status.as_u16()
        );
    }

    Ok(warp::reply::with_status(message, status))
}

#[cfg(test)]
mod tests {
    use super::{handle_rejection, ApiError};
    use roster_core::{Collection, ImageError, RepoError};
    use warp::http::StatusCode;
    use warp::{Rejection, Reply};

    #[tokio::test]
    async fn api_error_converts_into_rejection_with_its_status() {
        let rejection: Rejection = ApiError::BadRequest("bad form".to_string()).into();
        assert!(rejection.find::<ApiError>().is_some());

        let response = handle_rejection(rejection).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn repo_not_found_maps_to_404_and_other_failures_to_500() {
        let not_found = ApiError::from(RepoError::NotFound {
            collection: Collection::STUDENTS,
            id: "x".to_string(),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert!(not_found.to_string().contains("student/x"));

        let poisoned = ApiError::from(RepoError::LockPoisoned);
        assert_eq!(poisoned.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn image_client_errors_map_to_400() {
        let err = ApiError::from(ImageError::UnsupportedContentType("text/plain".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(ImageError::Io(std::io::Error::other("disk full")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
