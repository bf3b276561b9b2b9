use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use super::{current_user, ok, ok_with_message, ApiResult};
use crate::mock::error::MockError;
use crate::mock::state::MockState;
use crate::models::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserProfile};
use crate::policy::ViewerRole;

const ACCESS_TTL_SECS: i64 = 3600;

fn auth_response(state: &MockState, user_id: i64) -> Result<AuthResponse, MockError> {
    let mut data = state.data();
    let user = data
        .user(user_id)
        .map(|u| u.profile.clone())
        .ok_or_else(|| MockError::NotFound("User not found".to_string()))?;
    Ok(AuthResponse {
        tokens: data.issue_tokens(user_id),
        token_type: Some("Bearer".to_string()),
        expires_in: Some(ACCESS_TTL_SECS),
        user: Some(user),
    })
}

// POST /auth/login
pub async fn login(
    State(state): State<Arc<MockState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let login = body
        .email
        .as_deref()
        .or(body.phone.as_deref())
        .ok_or_else(|| MockError::BadRequest("Email or phone is required".to_string()))?;

    let user_id = {
        let data = state.data();
        match data.find_login(login) {
            Some(user) if user.password == body.password => user.profile.user_id,
            _ => return Err(MockError::BadRequest("Invalid credentials".to_string())),
        }
    };

    tracing::info!(user_id, "mock login");
    ok_with_message("Login successful", auth_response(&state, user_id)?)
}

// POST /auth/register
pub async fn register(
    State(state): State<Arc<MockState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    if body.email.is_none() && body.phone.is_none() {
        return Err(MockError::BadRequest("Email or phone is required".to_string()));
    }
    if body.password.len() < 6 {
        return Err(MockError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    let role = match body.user_type.as_deref().map(ViewerRole::parse) {
        None | Some(Some(ViewerRole::Customer)) => ViewerRole::Customer,
        Some(Some(ViewerRole::Provider)) => ViewerRole::Provider,
        _ => return Err(MockError::BadRequest("Invalid user type".to_string())),
    };

    let user_id = {
        let mut data = state.data();
        let taken = [body.email.as_deref(), body.phone.as_deref()]
            .into_iter()
            .flatten()
            .any(|login| data.find_login(login).is_some());
        if taken {
            return Err(MockError::BadRequest("User already exists".to_string()));
        }
        let user_id = data.next_user_id();
        data.add_user(
            UserProfile {
                user_id,
                name: body.name.clone(),
                email: body.email.clone(),
                phone: body.phone.clone(),
                user_type: role.as_str().to_string(),
                profile_image_url: None,
            },
            &body.password,
        );
        user_id
    };

    ok_with_message("Registration successful", auth_response(&state, user_id)?)
}

// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<MockState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<AuthResponse> {
    if !state.record_refresh() {
        tracing::debug!("refresh refused by test knob");
        return Err(MockError::Unauthorized);
    }

    let user_id = state
        .data()
        .refresh_tokens
        .remove(&body.refresh_token)
        .ok_or(MockError::Unauthorized)?;

    ok(auth_response(&state, user_id)?)
}

// GET /users/me
pub async fn profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> ApiResult<UserProfile> {
    let user = current_user(&headers, &state)?;
    ok(user.profile)
}
