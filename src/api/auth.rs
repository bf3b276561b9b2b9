use super::{ApiClient, ApiRequest};
use crate::errors::ApiError;
use crate::models::{
    AuthResponse, ChangePasswordRequest, GoogleLoginRequest, LoginRequest, OtpRequest,
    RefreshRequest, RegisterRequest, SetPasswordRequest, TokenPair, VerifyOtpRequest,
};

impl ApiClient {
    async fn authenticate(&self, request: ApiRequest) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self.fetch(request).await?;
        self.session().establish(&auth)?;
        Ok(auth)
    }

    pub async fn register(&self, body: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.authenticate(ApiRequest::post("/auth/register").json(body)?)
            .await
    }

    pub async fn login(&self, body: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.authenticate(ApiRequest::post("/auth/login").json(body)?)
            .await
    }

    pub async fn send_otp(&self, body: &OtpRequest) -> Result<Option<String>, ApiError> {
        self.submit(ApiRequest::post("/auth/send-otp").json(body)?).await
    }

    pub async fn verify_otp(&self, body: &VerifyOtpRequest) -> Result<AuthResponse, ApiError> {
        self.authenticate(ApiRequest::post("/auth/verify-otp").json(body)?)
            .await
    }

    pub async fn google_login(&self, body: &GoogleLoginRequest) -> Result<AuthResponse, ApiError> {
        self.authenticate(ApiRequest::post("/auth/google").json(body)?)
            .await
    }

    /// Explicit refresh through the regular request path. The interceptor
    /// uses its own direct call instead.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let tokens: TokenPair = self
            .fetch(ApiRequest::post("/auth/refresh").json(&body)?)
            .await?;
        self.session().replace_tokens(tokens.clone())?;
        Ok(tokens)
    }

    pub async fn change_password(
        &self,
        body: &ChangePasswordRequest,
    ) -> Result<Option<String>, ApiError> {
        self.submit(ApiRequest::post("/auth/change-password").json(body)?)
            .await
    }

    pub async fn set_password(&self, body: &SetPasswordRequest) -> Result<Option<String>, ApiError> {
        self.submit(ApiRequest::post("/auth/set-password").json(body)?)
            .await
    }

    /// Forgets the local credentials. The backend keeps no logout endpoint.
    pub fn logout(&self) -> Result<(), ApiError> {
        tracing::info!("logging out");
        self.session().clear()
    }
}
