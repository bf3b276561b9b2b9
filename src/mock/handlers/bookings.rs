use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::catalog::PageWindow;
use super::{current_user, ok, ok_with_message, ApiResult};
use crate::mock::error::MockError;
use crate::mock::state::{seed_booking, MockState, MockUser};
use crate::models::{
    Booking, BookingList, BookingStatus, CancelledBy, CreateBookingRequest, ReviewRequest,
    StatusUpdate,
};
use crate::policy::ViewerRole;

/// Lifecycle edges the backend accepts.
pub fn transition_allowed(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Accepted | Rejected | Cancelled)
            | (Accepted, Confirmed | Cancelled)
            | (Confirmed, InProgress | Cancelled)
            | (InProgress, Paused | Completed | Cancelled)
            | (Paused, InProgress | Cancelled)
            | (Completed, Disputed)
            | (Disputed, Refunded | Completed)
    )
}

/// Whether `user` may request `target` on `booking`, ignoring the current status.
fn may_request(user: &MockUser, booking: &Booking, target: BookingStatus) -> bool {
    match target {
        BookingStatus::Cancelled => user.can_see(booking),
        BookingStatus::Disputed => user.is_customer_of(booking),
        BookingStatus::Refunded => user.role() == Some(ViewerRole::Admin),
        _ => user.is_provider_of(booking),
    }
}

fn cancelled_by(user: &MockUser, booking: &Booking) -> CancelledBy {
    if user.is_provider_of(booking) {
        CancelledBy::Provider
    } else if user.is_customer_of(booking) {
        CancelledBy::User
    } else {
        CancelledBy::Admin
    }
}

fn not_found(booking_id: i64) -> MockError {
    MockError::NotFound(format!("Booking not found: {booking_id}"))
}

fn visible_bookings(state: &MockState, user: &MockUser) -> Vec<Booking> {
    let mut bookings: Vec<Booking> = state
        .data()
        .bookings
        .iter()
        .filter(|b| user.can_see(b))
        .cloned()
        .collect();
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    bookings
}

// POST /bookings
pub async fn create_booking(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> ApiResult<Booking> {
    let user = current_user(&headers, &state)?;
    if user.role() != Some(ViewerRole::Customer) {
        return Err(MockError::Forbidden("Only customers can create bookings".to_string()));
    }

    let mut data = state.data();
    let service = data
        .services
        .iter()
        .find(|s| s.service_id == body.service_id)
        .cloned()
        .ok_or_else(|| MockError::NotFound(format!("Service not found: {}", body.service_id)))?;
    let provider = data
        .providers
        .iter()
        .find(|p| p.provider_id == body.provider_id)
        .cloned()
        .ok_or_else(|| MockError::NotFound(format!("Provider not found: {}", body.provider_id)))?;

    let booking_id = data.allocate_booking_id();
    let mut booking = seed_booking(
        booking_id,
        BookingStatus::Pending,
        body.scheduled_date,
        &service,
        &provider,
        &user.profile,
    );
    let now = Utc::now().naive_utc();
    booking.scheduled_time = body.scheduled_time;
    booking.service_address = body.service_address;
    booking.service_landmark = body.service_landmark;
    booking.service_pincode = body.service_pincode;
    booking.issue_title = body.issue_title;
    booking.issue_description = body.issue_description;
    booking.issue_images = body.issue_images;
    booking.urgency_level = body.urgency_level;
    booking.travel_charge = None;
    booking.created_at = Some(now);
    booking.updated_at = Some(now);
    data.push_booking(booking.clone());

    tracing::info!(booking_id, "mock booking created");
    ok_with_message("Booking created successfully", booking)
}

#[derive(Debug, Deserialize)]
pub struct MyBookingsQuery {
    pub status: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

// GET /bookings/my-bookings
pub async fn my_bookings(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<MyBookingsQuery>,
) -> ApiResult<BookingList> {
    let user = current_user(&headers, &state)?;
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(BookingStatus::parse);

    let matching: Vec<Booking> = visible_bookings(&state, &user)
        .into_iter()
        .filter(|b| status.map_or(true, |s| b.booking_status == s))
        .collect();

    let window = PageWindow::new(query.page, query.size);
    let total = matching.len();
    ok(BookingList {
        bookings: window.slice(&matching),
        page: window.page_i32(),
        size: window.size_i32(),
        total: i64::try_from(total).unwrap_or(i64::MAX),
        total_pages: window.total_pages(total),
    })
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

// GET /bookings/recent
pub async fn recent_bookings(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Vec<Booking>> {
    let user = current_user(&headers, &state)?;
    let mut bookings = visible_bookings(&state, &user);
    bookings.truncate(query.limit.unwrap_or(5));
    ok(bookings)
}

// GET /bookings/:id
pub async fn booking(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(booking_id): Path<i64>,
) -> ApiResult<Booking> {
    let user = current_user(&headers, &state)?;
    let booking = state.booking(booking_id).ok_or_else(|| not_found(booking_id))?;
    if !user.can_see(&booking) {
        return Err(MockError::Forbidden(
            "You do not have access to this booking".to_string(),
        ));
    }
    ok(booking)
}

// GET /bookings/number/:number
pub async fn booking_by_number(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(number): Path<String>,
) -> ApiResult<Booking> {
    let user = current_user(&headers, &state)?;
    let booking = state
        .data()
        .bookings
        .iter()
        .find(|b| b.booking_number == number && user.can_see(b))
        .cloned()
        .ok_or_else(|| MockError::NotFound(format!("Booking not found: {number}")))?;
    ok(booking)
}

// PATCH /bookings/:id/status
pub async fn update_status(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(booking_id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Booking> {
    let user = current_user(&headers, &state)?;
    let target = update.target();

    let mut data = state.data();
    let booking = data.booking_mut(booking_id).ok_or_else(|| not_found(booking_id))?;

    if !user.can_see(booking) {
        return Err(MockError::Forbidden(
            "You do not have access to this booking".to_string(),
        ));
    }
    if target == BookingStatus::Unknown {
        return Err(MockError::BadRequest(format!("Invalid status: {}", update.status)));
    }
    if !may_request(&user, booking, target) {
        return Err(MockError::Forbidden(format!(
            "You are not allowed to mark this booking as {target}"
        )));
    }
    if !transition_allowed(booking.booking_status, target) {
        return Err(MockError::BadRequest(format!(
            "Cannot change booking status from {} to {target}",
            booking.booking_status
        )));
    }

    let now = Utc::now().naive_utc();
    match target {
        BookingStatus::Cancelled => {
            booking.cancelled_by = Some(cancelled_by(&user, booking));
            booking.cancellation_reason = update.reason;
            booking.cancelled_at = Some(now);
        }
        BookingStatus::Rejected => {
            booking.cancellation_reason = update.reason;
        }
        BookingStatus::Completed => {
            booking.work_summary = update.work_summary;
            booking.final_amount = update.final_amount.or(booking.estimated_amount);
        }
        BookingStatus::Accepted | BookingStatus::Confirmed => {
            if update.notes.is_some() {
                booking.provider_notes = update.notes;
            }
        }
        _ => {}
    }
    tracing::info!(
        booking_id,
        from = %booking.booking_status,
        to = %target,
        "mock booking status changed"
    );
    booking.booking_status = target;
    booking.updated_at = Some(now);

    ok_with_message("Booking status updated", booking.clone())
}

// POST /bookings/:id/review
pub async fn add_review(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(booking_id): Path<i64>,
    Json(review): Json<ReviewRequest>,
) -> ApiResult<serde_json::Value> {
    let user = current_user(&headers, &state)?;

    let mut data = state.data();
    let review_id = data.next_review_id();
    let booking = data.booking_mut(booking_id).ok_or_else(|| not_found(booking_id))?;

    if !user.is_customer_of(booking) {
        return Err(MockError::BadRequest(
            "Only the customer can review this booking".to_string(),
        ));
    }
    if booking.booking_status != BookingStatus::Completed {
        return Err(MockError::BadRequest(
            "Can only review completed bookings".to_string(),
        ));
    }
    if booking.user_rating.is_some() {
        return Err(MockError::BadRequest(
            "You have already reviewed this booking".to_string(),
        ));
    }
    if !(1.0..=5.0).contains(&review.overall_rating) {
        return Err(MockError::BadRequest("Rating must be between 1 and 5".to_string()));
    }

    booking.user_rating = Some(review.overall_rating);
    booking.updated_at = Some(Utc::now().naive_utc());

    ok_with_message(
        "Review added successfully",
        serde_json::json!({
            "reviewId": review_id,
            "bookingId": booking_id,
            "overallRating": review.overall_rating,
            "reviewText": review.review_text,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use BookingStatus::*;

    #[test]
    fn test_transition_table() {
        assert!(transition_allowed(Pending, Accepted));
        assert!(transition_allowed(Pending, Rejected));
        assert!(transition_allowed(Accepted, Confirmed));
        assert!(transition_allowed(Confirmed, InProgress));
        assert!(transition_allowed(InProgress, Paused));
        assert!(transition_allowed(Paused, InProgress));
        assert!(transition_allowed(Completed, Disputed));
        assert!(transition_allowed(Disputed, Refunded));

        assert!(!transition_allowed(Pending, Confirmed));
        assert!(!transition_allowed(Completed, Cancelled));
        assert!(!transition_allowed(Cancelled, Pending));
        assert!(!transition_allowed(Rejected, Accepted));
        assert!(!transition_allowed(Refunded, Completed));
    }

    #[test]
    fn test_cancel_allowed_until_in_progress_ends() {
        for from in [Pending, Accepted, Confirmed, InProgress, Paused] {
            assert!(transition_allowed(from, Cancelled), "{from}");
        }
    }
}
