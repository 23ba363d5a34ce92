use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::rest::dto::ErrorDto;
use crate::domain::error::DomainError;

/// Transport wrapper that renders a [`DomainError`] as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::validation("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(DomainError::validation("query", rejection.body_text()))
    }
}

pub fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::UserNotFound { .. } | DomainError::NoteNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        DomainError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "storage failure");
        }
        (
            status,
            Json(ErrorDto {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
