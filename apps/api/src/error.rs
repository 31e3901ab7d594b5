use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chapterdesk_core::AppError;
use tracing::error;

mod types;

pub use types::ErrorResponse;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal(detail) = &self.0 {
            error!(%detail, "request failed with internal error");
        }

        (status, Json(ErrorResponse::new(public_message(&self.0)))).into_response()
    }
}

/// Client-facing text for an error. Internal details stay in the logs.
pub(crate) fn public_message(error: &AppError) -> String {
    match error {
        AppError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_owned(),
        other => other.to_string(),
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
