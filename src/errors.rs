use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("forbidden: {}", .0.as_deref().unwrap_or("access denied"))]
    Forbidden(Option<String>),

    #[error("request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("server error ({status})")]
    Server { status: StatusCode },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Classifies a non-success response. `message` is the envelope's `message` field.
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthenticated,
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            s if s.is_client_error() => ApiError::Rejected { status: s, message },
            s => ApiError::Server { status: s },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthenticated | ApiError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            ApiError::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            ApiError::Rejected { status, .. } | ApiError::Server { status } => Some(*status),
            _ => None,
        }
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::SessionExpired | ApiError::Unauthenticated)
    }

    /// Text for a transient notification. Server-provided messages win for
    /// authorization and validation failures; everything else gets `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Forbidden(Some(message)) | ApiError::Rejected { message: Some(message), .. }
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            ApiError::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            ApiError::Transport(_) => {
                format!("{fallback}: could not reach the server")
            }
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, None),
            ApiError::Unauthenticated
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, Some("providers only".into())),
            ApiError::Forbidden(Some(_))
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, None),
            ApiError::Rejected { status: StatusCode::BAD_REQUEST, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, None),
            ApiError::Rejected { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, Some("upstream".into())),
            ApiError::Server { .. }
        ));
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            Some("Invalid status transition from PENDING to COMPLETED".into()),
        );
        assert_eq!(
            err.user_message("Failed to update status"),
            "Invalid status transition from PENDING to COMPLETED"
        );
    }

    #[test]
    fn test_server_errors_are_generic() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, Some("NullPointerException".into()));
        assert_eq!(err.user_message("Failed to cancel booking"), "Failed to cancel booking");
    }

    #[test]
    fn test_blank_message_falls_back() {
        let err = ApiError::from_status(StatusCode::CONFLICT, Some(" ".into()));
        assert_eq!(err.user_message("Failed to submit review"), "Failed to submit review");
    }
}
