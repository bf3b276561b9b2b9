use super::{ApiClient, ApiRequest, PageParams};
use crate::errors::ApiError;
use crate::models::{Category, Paged, ServiceItem};

impl ApiClient {
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch(ApiRequest::get("/categories")).await
    }

    pub async fn category_by_slug(&self, slug: &str) -> Result<Category, ApiError> {
        self.fetch(ApiRequest::get(format!("/categories/{slug}")))
            .await
    }

    pub async fn featured_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch(ApiRequest::get("/categories/featured")).await
    }

    pub async fn root_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch(ApiRequest::get("/categories/root")).await
    }

    pub async fn services_by_category(
        &self,
        category_id: i64,
        page: &PageParams,
    ) -> Result<Paged<ServiceItem>, ApiError> {
        self.fetch(ApiRequest::get(format!("/services/category/{category_id}")).page(page))
            .await
    }

    pub async fn services_by_category_slug(
        &self,
        slug: &str,
        page: &PageParams,
    ) -> Result<Paged<ServiceItem>, ApiError> {
        self.fetch(ApiRequest::get(format!("/services/category/slug/{slug}")).page(page))
            .await
    }

    pub async fn service(&self, service_id: i64) -> Result<ServiceItem, ApiError> {
        self.fetch(ApiRequest::get(format!("/services/{service_id}")))
            .await
    }

    pub async fn search_services(
        &self,
        query: &str,
        page: &PageParams,
    ) -> Result<Paged<ServiceItem>, ApiError> {
        self.fetch(
            ApiRequest::get("/services/search")
                .query("query", query)
                .page(page),
        )
        .await
    }

    pub async fn popular_services(&self, page: &PageParams) -> Result<Paged<ServiceItem>, ApiError> {
        self.fetch(ApiRequest::get("/services/popular").page(page))
            .await
    }

    pub async fn featured_services(&self) -> Result<Vec<ServiceItem>, ApiError> {
        self.fetch(ApiRequest::get("/services/featured")).await
    }
}
