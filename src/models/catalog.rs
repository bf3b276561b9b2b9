use serde::{Deserialize, Serialize};

use super::Provider;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
    pub category_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceItem {
    pub service_id: i64,
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times_booked: Option<i64>,
    pub is_featured: bool,
    pub service_highlights: Vec<String>,
    pub materials_included: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advance_booking_hours: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_hours: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
}

impl ServiceItem {
    pub fn advance_booking_hours(&self) -> i32 {
        self.advance_booking_hours.unwrap_or(2)
    }

    pub fn cancellation_hours(&self) -> i32 {
        self.cancellation_hours.unwrap_or(4)
    }
}

/// Spring-style page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub content: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
}
