use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Every failure a handler can report. Rejected list queries are not errors;
/// they travel as a normal envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{label} not found with id of {id}")]
    NotFound { label: &'static str, id: String },

    #[error("{0}")]
    InvalidBody(String),

    #[error("Duplicate field value entered")]
    Duplicate { field: &'static str },

    #[error("Malformed query string: {0}")]
    MalformedQuery(String),

    #[error("{0}")]
    InvalidParameter(String),

    #[error("No location found for {0}")]
    UnknownLocation(String),

    #[error("Server Error")]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(label: &'static str, id: impl Into<String>) -> Self {
        ApiError::NotFound { label, id: id.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } | ApiError::UnknownLocation(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(_)
            | ApiError::Duplicate { .. }
            | ApiError::MalformedQuery(_)
            | ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: false,
            error: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Upstream(cause) => log::error!("Store failure: {:#}", cause),
            ApiError::Duplicate { field } => log::warn!("Duplicate value for unique field {}", field),
            other => log::debug!("Request failed: {}", other),
        }

        let status = self.status_code();
        (status, Json(ErrorResponse::new(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("Bootcamp", "1").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InvalidBody("Please add a name".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Duplicate { field: "name" }.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidParameter("Distance must be a non-negative number".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnknownLocation("99999".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(anyhow::anyhow!("connection refused")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::not_found("Bootcamp", "abc").to_string(),
            "Bootcamp not found with id of abc"
        );
        // The cause of a store failure is logged, never sent to the client.
        assert_eq!(ApiError::from(anyhow::anyhow!("password=secret")).to_string(), "Server Error");
    }
}
