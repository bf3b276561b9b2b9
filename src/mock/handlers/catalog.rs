use std::sync::Arc;

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{ok, ApiResult};
use crate::mock::error::MockError;
use crate::mock::state::MockState;
use crate::models::{Category, Paged, Provider, ServiceItem};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

/// Zero-based page bounds. Offsets saturate and reported numbers clamp to the
/// wire's `i32` range, so any query-string value is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: usize,
    size: usize,
}

impl PageWindow {
    pub const DEFAULT_SIZE: usize = 20;

    pub fn new(page: Option<usize>, size: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(Self::DEFAULT_SIZE).max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items.iter().skip(self.offset()).take(self.size).cloned().collect()
    }

    pub fn page_i32(&self) -> i32 {
        clamp_i32(self.page)
    }

    pub fn size_i32(&self) -> i32 {
        clamp_i32(self.size)
    }

    pub fn total_pages(&self, total: usize) -> i32 {
        clamp_i32(total.div_ceil(self.size))
    }
}

fn clamp_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

pub fn paginate<T: Clone>(items: &[T], query: &PageQuery) -> Paged<T> {
    let window = PageWindow::new(query.page, query.size);
    Paged {
        content: window.slice(items),
        total_elements: Some(i64::try_from(items.len()).unwrap_or(i64::MAX)),
        total_pages: Some(window.total_pages(items.len())),
        number: Some(window.page_i32()),
        size: Some(window.size_i32()),
    }
}

// GET /categories
pub async fn categories(State(state): State<Arc<MockState>>) -> ApiResult<Vec<Category>> {
    ok(state.data().categories.clone())
}

// GET /categories/featured
pub async fn featured_categories(State(state): State<Arc<MockState>>) -> ApiResult<Vec<Category>> {
    let data = state.data();
    ok(data
        .categories
        .iter()
        .filter(|c| c.service_count.unwrap_or(0) > 0)
        .cloned()
        .collect())
}

// GET /categories/:slug
pub async fn category_by_slug(
    State(state): State<Arc<MockState>>,
    Path(slug): Path<String>,
) -> ApiResult<Category> {
    let category = state
        .data()
        .categories
        .iter()
        .find(|c| c.category_slug == slug)
        .cloned()
        .ok_or_else(|| MockError::NotFound(format!("Category not found: {slug}")))?;
    ok(category)
}

// GET /services/:id
pub async fn service(
    State(state): State<Arc<MockState>>,
    Path(service_id): Path<i64>,
) -> ApiResult<ServiceItem> {
    let service = state
        .data()
        .services
        .iter()
        .find(|s| s.service_id == service_id)
        .cloned()
        .ok_or_else(|| MockError::NotFound(format!("Service not found: {service_id}")))?;
    ok(service)
}

// GET /services/featured
pub async fn featured_services(State(state): State<Arc<MockState>>) -> ApiResult<Vec<ServiceItem>> {
    ok(state.data().services.clone())
}

// GET /services/category/:id
pub async fn services_by_category(
    State(state): State<Arc<MockState>>,
    Path(category_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Paged<ServiceItem>> {
    let data = state.data();
    let matching: Vec<ServiceItem> = data
        .services
        .iter()
        .filter(|s| s.category.as_ref().is_some_and(|c| c.category_id == category_id))
        .cloned()
        .collect();
    ok(paginate(&matching, &query))
}

// GET /providers/featured
pub async fn featured_providers(State(state): State<Arc<MockState>>) -> ApiResult<Vec<Provider>> {
    ok(state.data().providers.clone())
}

// GET /providers/:id
pub async fn provider(
    State(state): State<Arc<MockState>>,
    Path(provider_id): Path<i64>,
) -> ApiResult<Provider> {
    let provider = state
        .data()
        .providers
        .iter()
        .find(|p| p.provider_id == provider_id)
        .cloned()
        .ok_or_else(|| MockError::NotFound(format!("Provider not found: {provider_id}")))?;
    ok(provider)
}
