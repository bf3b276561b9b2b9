use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Provider {
    pub provider_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_bookings: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub service_categories: Vec<String>,
}

impl Provider {
    pub fn display_name(&self) -> &str {
        self.business_name
            .as_deref()
            .or(self.provider_name.as_deref())
            .unwrap_or("Provider")
    }

    /// Unrated providers are shown as 5.0.
    pub fn rating(&self) -> f64 {
        self.average_rating.unwrap_or(5.0)
    }
}
