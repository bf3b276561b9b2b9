pub mod auth;
pub mod bookings;
pub mod catalog;

use axum::http::HeaderMap;
use axum::Json;

use super::error::MockError;
use super::state::{MockState, MockUser};
use crate::models::Envelope;

pub type ApiResult<T> = Result<Json<Envelope<T>>, MockError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope::ok(data)))
}

pub fn ok_with_message<T>(message: &str, data: T) -> ApiResult<T> {
    Ok(Json(Envelope::ok_with_message(message, data)))
}

/// Resolves the bearer token to a user, or 401.
pub fn current_user(headers: &HeaderMap, state: &MockState) -> Result<MockUser, MockError> {
    if state.access_rejected() {
        return Err(MockError::Unauthorized);
    }

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(MockError::Unauthorized)?;

    let data = state.data();
    data.access_tokens
        .get(token)
        .and_then(|user_id| data.user(*user_id))
        .cloned()
        .ok_or(MockError::Unauthorized)
}
