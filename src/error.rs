use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Failures surfaced by the directory, auth and ledger services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("No account found with that email")]
    UserNotFound,
    #[error("Invalid or expired reset code")]
    InvalidOrExpiredCode,
    #[error("Failed to send email: {0}")]
    EmailDeliveryFailed(String),
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::DuplicateEmail | Self::DuplicateUsername => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserNotFound | Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidOrExpiredCode | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::EmailDeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
