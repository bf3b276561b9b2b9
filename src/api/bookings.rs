use super::{ApiClient, ApiRequest, PageParams};
use crate::errors::ApiError;
use crate::models::{
    Booking, BookingList, BookingStatus, CreateBookingRequest, ReviewRequest, StatusUpdate,
};

pub const DEFAULT_RECENT_LIMIT: u32 = 3;

impl ApiClient {
    pub async fn create_booking(&self, body: &CreateBookingRequest) -> Result<Booking, ApiError> {
        self.fetch(ApiRequest::post("/bookings").json(body)?).await
    }

    pub async fn my_bookings(
        &self,
        status: Option<BookingStatus>,
        page: &PageParams,
    ) -> Result<BookingList, ApiError> {
        self.fetch(
            ApiRequest::get("/bookings/my-bookings")
                .query_opt("status", status.map(|s| s.as_str()))
                .page(page),
        )
        .await
    }

    pub async fn recent_bookings(&self, limit: u32) -> Result<Vec<Booking>, ApiError> {
        self.fetch(ApiRequest::get("/bookings/recent").query("limit", limit))
            .await
    }

    pub async fn booking(&self, booking_id: i64) -> Result<Booking, ApiError> {
        self.fetch(ApiRequest::get(format!("/bookings/{booking_id}")))
            .await
    }

    pub async fn booking_by_number(&self, number: &str) -> Result<Booking, ApiError> {
        self.fetch(ApiRequest::get(format!("/bookings/number/{number}")))
            .await
    }

    pub async fn update_booking_status(
        &self,
        booking_id: i64,
        update: &StatusUpdate,
    ) -> Result<Booking, ApiError> {
        tracing::info!(booking_id, status = %update.status, "updating booking status");
        self.fetch(ApiRequest::patch(format!("/bookings/{booking_id}/status")).json(update)?)
            .await
    }

    pub async fn cancel_booking(
        &self,
        booking_id: i64,
        reason: Option<String>,
    ) -> Result<Booking, ApiError> {
        let mut update = StatusUpdate::new(BookingStatus::Cancelled);
        update.reason = reason;
        self.update_booking_status(booking_id, &update).await
    }

    pub async fn add_review(
        &self,
        booking_id: i64,
        review: &ReviewRequest,
    ) -> Result<Option<String>, ApiError> {
        tracing::info!(booking_id, rating = review.overall_rating, "submitting review");
        self.submit(ApiRequest::post(format!("/bookings/{booking_id}/review")).json(review)?)
            .await
    }

    pub async fn search_bookings(
        &self,
        keyword: &str,
        page: &PageParams,
    ) -> Result<BookingList, ApiError> {
        self.fetch(
            ApiRequest::get("/bookings/search")
                .query("keyword", keyword)
                .page(page),
        )
        .await
    }
}
