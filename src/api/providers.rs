use super::{ApiClient, ApiRequest, PageParams};
use crate::errors::ApiError;
use crate::models::{Paged, Provider, ServiceItem};

pub const DEFAULT_RADIUS_KM: f64 = 10.0;

impl ApiClient {
    pub async fn provider(&self, provider_id: i64) -> Result<Provider, ApiError> {
        self.fetch(ApiRequest::get(format!("/providers/{provider_id}")))
            .await
    }

    pub async fn provider_services(
        &self,
        provider_id: i64,
        page: &PageParams,
    ) -> Result<Paged<ServiceItem>, ApiError> {
        self.fetch(ApiRequest::get(format!("/providers/{provider_id}/services")).page(page))
            .await
    }

    pub async fn nearby_providers(&self, pincode: &str) -> Result<Vec<Provider>, ApiError> {
        self.fetch(ApiRequest::get("/providers/nearby").query("pincode", pincode))
            .await
    }

    pub async fn nearby_providers_by_location(
        &self,
        lat: f64,
        lng: f64,
        radius_km: Option<f64>,
        category_id: Option<i64>,
    ) -> Result<Vec<Provider>, ApiError> {
        self.fetch(
            ApiRequest::get("/providers/nearby/location")
                .query("lat", lat)
                .query("lng", lng)
                .query("radiusKm", radius_km.unwrap_or(DEFAULT_RADIUS_KM))
                .query_opt("categoryId", category_id),
        )
        .await
    }

    pub async fn featured_providers(&self) -> Result<Vec<Provider>, ApiError> {
        self.fetch(ApiRequest::get("/providers/featured")).await
    }

    pub async fn top_rated_providers(&self, page: &PageParams) -> Result<Vec<Provider>, ApiError> {
        self.fetch(ApiRequest::get("/providers/top-rated").page(page))
            .await
    }

    pub async fn providers_by_category(
        &self,
        category_id: i64,
        page: &PageParams,
    ) -> Result<Paged<Provider>, ApiError> {
        self.fetch(ApiRequest::get(format!("/providers/category/{category_id}")).page(page))
            .await
    }
}
