use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracker_core::TrackerError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error as the API reports it: a status code and a caller-safe message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Maps a tracker error onto the API.
    ///
    /// Caller errors keep their message. Store, network and other unexpected
    /// failures are logged and reported as `500` with `fallback` only.
    pub fn from_tracker(err: TrackerError, fallback: &str) -> Self {
        match err {
            TrackerError::Validation(message) => Self::bad_request(message),
            TrackerError::NotFound(message) => Self::not_found(message),
            TrackerError::PrerequisitesPending => Self::bad_request(err.to_string()),
            other => {
                tracing::error!(error = %other, "{}", fallback);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

pub trait ApiResultExt<T> {
    fn or_api(self, fallback: &str) -> Result<T, ApiError>;
}

impl<T> ApiResultExt<T> for tracker_core::Result<T> {
    fn or_api(self, fallback: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_tracker(e, fallback))
    }
}
