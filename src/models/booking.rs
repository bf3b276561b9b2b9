use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: i64,
    pub booking_number: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_end_time: Option<String>,
    #[serde(default)]
    pub service_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_landmark: Option<String>,
    #[serde(default)]
    pub service_pincode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_description: Option<String>,
    #[serde(default)]
    pub issue_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_charge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_amount: Option<f64>,
    pub booking_status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<CancelledBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerInfo>,
}

impl Booking {
    /// Amount the customer pays: the final amount once set, the estimate before that.
    pub fn total(&self) -> f64 {
        match self.final_amount {
            Some(amount) if amount != 0.0 => amount,
            _ => self.estimated_amount.unwrap_or(0.0),
        }
    }

    pub fn has_rating(&self) -> bool {
        self.user_rating.is_some()
    }

    pub fn service_name(&self) -> &str {
        self.service
            .as_ref()
            .map(|s| s.service_name.as_str())
            .unwrap_or("Service")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    Confirmed,
    InProgress,
    Paused,
    Completed,
    Cancelled,
    Disputed,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 11] = [
        BookingStatus::Pending,
        BookingStatus::Accepted,
        BookingStatus::Rejected,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Paused,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Disputed,
        BookingStatus::Refunded,
        BookingStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Accepted => "ACCEPTED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::Paused => "PAUSED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Disputed => "DISPUTED",
            BookingStatus::Refunded => "REFUNDED",
            BookingStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => BookingStatus::Pending,
            "ACCEPTED" => BookingStatus::Accepted,
            "REJECTED" => BookingStatus::Rejected,
            "CONFIRMED" => BookingStatus::Confirmed,
            "IN_PROGRESS" => BookingStatus::InProgress,
            "PAUSED" => BookingStatus::Paused,
            "COMPLETED" => BookingStatus::Completed,
            "CANCELLED" => BookingStatus::Cancelled,
            "DISPUTED" => BookingStatus::Disputed,
            "REFUNDED" => BookingStatus::Refunded,
            _ => BookingStatus::Unknown,
        }
    }

    /// Human label, e.g. `IN PROGRESS`.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::Rejected | BookingStatus::Refunded
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelledBy {
    User,
    Provider,
    Admin,
    System,
}

impl CancelledBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelledBy::User => "user",
            CancelledBy::Provider => "provider",
            CancelledBy::Admin => "admin",
            CancelledBy::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub service_id: i64,
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub provider_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_bookings: Option<i32>,
}

impl ProviderInfo {
    pub fn display_name(&self) -> &str {
        self.business_name
            .as_deref()
            .or(self.provider_name.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub user_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingList {
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub page: i32,
    #[serde(default)]
    pub size: i32,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub total_pages: i32,
}

/// Body of `PATCH /bookings/{id}/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_summary: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: BookingStatus) -> Self {
        Self {
            status: status.as_str().to_string(),
            ..Self::default()
        }
    }

    pub fn target(&self) -> BookingStatus {
        BookingStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub overall_rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub punctuality_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professionalism_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_for_money_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,
    #[serde(default)]
    pub review_images: Vec<String>,
}

impl ReviewRequest {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    /// Star rating plus optional free text. Ratings outside 1..=5 are refused.
    pub fn new(rating: u8, text: Option<String>) -> Option<Self> {
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&rating) {
            return None;
        }
        Some(Self {
            overall_rating: f64::from(rating),
            review_text: text.filter(|t| !t.trim().is_empty()),
            ..Self::default()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub service_id: i64,
    pub provider_id: i64,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub service_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_landmark: Option<String>,
    pub service_pincode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_description: Option<String>,
    #[serde(default)]
    pub issue_images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "bookingId": 42,
        "bookingNumber": "HL2406150001",
        "scheduledDate": "2025-06-15",
        "scheduledTime": "14:00",
        "serviceAddress": "12 Lake Road",
        "servicePincode": "560001",
        "estimatedAmount": 499.0,
        "materialCost": 0,
        "finalAmount": null,
        "bookingStatus": "IN_PROGRESS",
        "cancelledBy": null,
        "userRating": null,
        "createdAt": "2025-06-10T09:30:00",
        "service": {"serviceId": 7, "serviceName": "Fan Repair", "categoryName": "Electrician"},
        "provider": {"providerId": 3, "providerName": "Ravi", "averageRating": 4.5},
        "customer": {"userId": 11, "name": "Asha", "phone": "9876543210"}
    }"#;

    #[test]
    fn test_parse_backend_booking() {
        let b: Booking = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(b.booking_id, 42);
        assert_eq!(b.booking_status, BookingStatus::InProgress);
        assert_eq!(b.service_name(), "Fan Repair");
        assert_eq!(b.provider.as_ref().unwrap().display_name(), "Ravi");
        assert!(!b.has_rating());
        assert_eq!(b.total(), 499.0);
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let json = SAMPLE.replace("IN_PROGRESS", "ON_HOLD");
        let b: Booking = serde_json::from_str(&json).unwrap();
        assert_eq!(b.booking_status, BookingStatus::Unknown);
    }

    #[test]
    fn test_total_prefers_final_amount() {
        let mut b: Booking = serde_json::from_str(SAMPLE).unwrap();
        b.final_amount = Some(650.0);
        assert_eq!(b.total(), 650.0);
        b.final_amount = Some(0.0);
        assert_eq!(b.total(), 499.0);
    }

    #[test]
    fn test_status_parse_and_label() {
        assert_eq!(BookingStatus::parse("in_progress"), BookingStatus::InProgress);
        assert_eq!(BookingStatus::parse("bogus"), BookingStatus::Unknown);
        assert_eq!(BookingStatus::InProgress.label(), "IN PROGRESS");
        assert!(BookingStatus::Rejected.is_terminal());
        assert!(!BookingStatus::Completed.is_terminal());
    }

    #[test]
    fn test_status_update_serializes_camel_case() {
        let mut update = StatusUpdate::new(BookingStatus::Completed);
        update.work_summary = Some("done".to_string());
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "COMPLETED", "workSummary": "done"})
        );
        assert_eq!(update.target(), BookingStatus::Completed);
    }

    #[test]
    fn test_review_rating_bounds() {
        assert!(ReviewRequest::new(0, None).is_none());
        assert!(ReviewRequest::new(6, None).is_none());
        let review = ReviewRequest::new(5, Some("great".to_string())).unwrap();
        assert_eq!(review.overall_rating, 5.0);
        assert_eq!(review.review_text.as_deref(), Some("great"));
        let blank = ReviewRequest::new(3, Some("   ".to_string())).unwrap();
        assert!(blank.review_text.is_none());
    }
}
