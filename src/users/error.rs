use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::users::dto::ErrorBody;
use crate::users::repo::StoreError;
use crate::users::validate::FieldError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user with id {0} not found")]
    NotFound(String),

    #[error("email '{0}' already registered")]
    EmailTaken(String),

    #[error("validation failed: {}", field_errors_message(.0))]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type UserResult<T> = Result<T, UserError>;

fn field_errors_message(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Single boundary where domain errors become status codes. Anything not
/// recoverable by the client is logged here and surfaces as a generic 500.
impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            UserError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            UserError::EmailTaken(_) => (StatusCode::CONFLICT, self.to_string()),
            UserError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            UserError::Store(e) => {
                error!(error = %e, "store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            UserError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
