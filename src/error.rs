use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use poisson_blend::BlendError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Image error: {0}")]
    Codec(#[from] CodecError),

    #[error("{name} image too large: {pixels} pixels (max {max})")]
    TooLarge {
        name: &'static str,
        pixels: usize,
        max: usize,
    },

    #[error("Blend failed: {0}")]
    Blend(#[from] BlendError),

    #[error("Blend task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("PNG decode error: {0}")]
    Decode(String),

    #[error("PNG encode error: {0}")]
    Encode(String),

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(usize),

    #[error("Image dimensions {width}x{height} exceed the PNG limit")]
    Dimensions { width: usize, height: usize },

    #[error("PNG of {pixels} pixels exceeds the limit of {max}")]
    TooLarge { pixels: usize, max: usize },
}

impl From<png::DecodingError> for CodecError {
    fn from(e: png::DecodingError) -> Self {
        CodecError::Decode(e.to_string())
    }
}

impl From<png::EncodingError> for CodecError {
    fn from(e: png::EncodingError) -> Self {
        CodecError::Encode(e.to_string())
    }
}

impl ServiceError {
    /// HTTP status for this failure.
    ///
    /// Unreadable input is the client's fault, a blend whose inputs violate
    /// its preconditions is unprocessable, a failing solve is ours.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Codec(CodecError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Codec(CodecError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::Codec(_) => StatusCode::BAD_REQUEST,
            ServiceError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::Blend(
                BlendError::InvalidShape(_)
                | BlendError::EmptyRegion
                | BlendError::BorderContact { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Blend(BlendError::SingularSystem { .. } | BlendError::Solver { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(e) => e.status(),
        };
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "Request rejected");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poisson_blend::SolveError;

    #[test]
    fn test_api_error_bad_request() {
        let error = ApiError::BadRequest("source is not valid base64".to_string());
        assert_eq!(error.to_string(), "Bad request: source is not valid base64");
    }

    #[test]
    fn test_service_error_too_large() {
        let error = ServiceError::TooLarge {
            name: "target",
            pixels: 100_000,
            max: 90_000,
        };
        assert_eq!(
            error.to_string(),
            "target image too large: 100000 pixels (max 90000)"
        );
    }

    #[test]
    fn test_service_error_from_blend_error() {
        let error: ServiceError = BlendError::EmptyRegion.into();
        assert_eq!(error.to_string(), "Blend failed: blend region is empty");
    }

    #[test]
    fn test_codec_error_unsupported_channels() {
        let error = CodecError::UnsupportedChannels(5);
        assert_eq!(error.to_string(), "Unsupported channel count: 5");
    }

    #[test]
    fn test_api_error_into_response_status_codes() {
        let status = |e: ApiError| e.into_response().status();

        assert_eq!(
            status(ApiError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ServiceError::Codec(CodecError::Decode("bad".to_string())).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ServiceError::Codec(CodecError::Encode("bad".to_string())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(
                ServiceError::TooLarge {
                    name: "source",
                    pixels: 2,
                    max: 1
                }
                .into()
            ),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status(ServiceError::Blend(BlendError::EmptyRegion).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(ServiceError::Blend(BlendError::BorderContact { row: 0, col: 3 }).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(ServiceError::Blend(BlendError::InvalidShape("mask".to_string())).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(ServiceError::Blend(BlendError::SingularSystem { channel: 1 }).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(
                ServiceError::Blend(BlendError::Solver {
                    channel: 0,
                    source: SolveError::TooLarge { dim: 9, max: 4 }
                })
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(ServiceError::Task("panicked".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
