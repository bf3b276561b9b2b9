use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = match &self {
            MockError::Unauthorized => StatusCode::UNAUTHORIZED,
            MockError::Forbidden(_) => StatusCode::FORBIDDEN,
            MockError::NotFound(_) => StatusCode::NOT_FOUND,
            MockError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Envelope::<()>::error(self.to_string());
        (status, axum::Json(body)).into_response()
    }
}
