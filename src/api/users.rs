use super::{ApiClient, ApiRequest};
use crate::errors::ApiError;
use crate::models::{Address, UpdateProfileRequest, UserProfile};

impl ApiClient {
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.fetch(ApiRequest::get("/users/me")).await
    }

    pub async fn update_profile(&self, body: &UpdateProfileRequest) -> Result<UserProfile, ApiError> {
        self.fetch(ApiRequest::put("/users/me").json(body)?).await
    }

    pub async fn addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.fetch(ApiRequest::get("/users/me/addresses")).await
    }

    pub async fn add_address(&self, address: &Address) -> Result<Address, ApiError> {
        self.fetch(ApiRequest::post("/users/me/addresses").json(address)?)
            .await
    }

    pub async fn update_address(&self, address_id: i64, address: &Address) -> Result<Address, ApiError> {
        self.fetch(ApiRequest::put(format!("/users/me/addresses/{address_id}")).json(address)?)
            .await
    }

    pub async fn delete_address(&self, address_id: i64) -> Result<Option<String>, ApiError> {
        self.submit(ApiRequest::delete(format!("/users/me/addresses/{address_id}")))
            .await
    }
}
