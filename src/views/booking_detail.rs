use std::fmt;

use crate::cache::QueryKey;
use crate::errors::ApiError;
use crate::models::{Booking, BookingStatus, ReviewRequest};
use crate::policy::{
    status_update, ActionInput, ActionSet, BookingAction, ViewerRole, Visibility,
    DEFAULT_REVIEW_RATING,
};

use super::{long_date, money, Notification, ViewContext};

/// A booking as one viewer sees it.
#[derive(Debug, Clone)]
pub struct BookingDetail {
    pub booking: Booking,
    pub role: ViewerRole,
    pub actions: ActionSet,
    pub visibility: Visibility,
}

impl BookingDetail {
    pub fn new(booking: Booking, role: ViewerRole) -> Self {
        Self {
            actions: booking.available_actions(role),
            visibility: Visibility::for_role(role),
            booking,
            role,
        }
    }
}

impl fmt::Display for BookingDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.booking;

        writeln!(f, "Booking #{}  [{}]", b.booking_number, b.booking_status.label())?;
        writeln!(f)?;
        writeln!(f, "Service:   {}", b.service_name())?;
        if let Some(category) = b.service.as_ref().and_then(|s| s.category_name.as_deref()) {
            writeln!(f, "Category:  {category}")?;
        }
        if let Some(issue) = &b.issue_description {
            writeln!(f, "Issue:     {issue}")?;
        }
        writeln!(f, "Date:      {}", long_date(b.scheduled_date))?;
        writeln!(f, "Time:      {}", b.scheduled_time)?;
        writeln!(f, "Address:   {}", b.service_address)?;
        if let Some(landmark) = &b.service_landmark {
            writeln!(f, "           Near {landmark}")?;
        }
        if !b.service_pincode.is_empty() {
            writeln!(f, "           {}", b.service_pincode)?;
        }

        if self.visibility.provider {
            if let Some(provider) = &b.provider {
                writeln!(f)?;
                writeln!(
                    f,
                    "Provider:  {} (★ {:.1}, {} jobs)",
                    provider.display_name(),
                    provider.average_rating.unwrap_or(5.0),
                    provider.completed_bookings.unwrap_or(0)
                )?;
                if let Some(phone) = &provider.phone {
                    writeln!(f, "           {phone}")?;
                }
            }
        }

        if self.visibility.customer {
            if let Some(customer) = &b.customer {
                writeln!(f)?;
                writeln!(f, "Customer:  {}", customer.name)?;
                if let Some(phone) = &customer.phone {
                    writeln!(f, "           {phone}")?;
                }
                if self.visibility.customer_email {
                    if let Some(email) = &customer.email {
                        writeln!(f, "           {email}")?;
                    }
                }
            }
        }

        if let Some(summary) = &b.work_summary {
            writeln!(f)?;
            writeln!(f, "Work summary: {summary}")?;
        }

        if b.booking_status == BookingStatus::Cancelled {
            if let Some(reason) = &b.cancellation_reason {
                writeln!(f)?;
                writeln!(f, "Cancellation reason: {reason}")?;
                let by = b.cancelled_by.map(|c| c.as_str()).unwrap_or("unknown");
                match b.cancelled_at {
                    Some(at) => writeln!(f, "Cancelled by {by} on {}", at.format("%b %-d, %Y"))?,
                    None => writeln!(f, "Cancelled by {by}")?,
                }
            }
        }

        if let Some(rating) = b.user_rating {
            writeln!(f, "Your rating: {rating:.1}")?;
        }

        writeln!(f)?;
        writeln!(f, "Service charge: {}", money(b.estimated_amount.unwrap_or(0.0)))?;
        for (label, amount) in [
            ("Materials", b.material_cost),
            ("Travel", b.travel_charge),
        ] {
            if let Some(amount) = amount.filter(|a| *a > 0.0) {
                writeln!(f, "{label}: {}", money(amount))?;
            }
        }
        if let Some(discount) = b.discount_amount.filter(|a| *a > 0.0) {
            writeln!(f, "Discount: -{}", money(discount))?;
        }
        writeln!(f, "Total: {}", money(b.total()))?;

        if !self.actions.is_empty() {
            writeln!(f)?;
            writeln!(f, "Actions:")?;
            for action in self.actions.iter() {
                writeln!(f, "  {:<9} {}", action.as_str(), action.label())?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub notification: Notification,
    /// The booking as refetched after a successful write.
    pub refreshed: Option<BookingDetail>,
}

impl ActionOutcome {
    fn failed(notification: Notification) -> Self {
        Self {
            notification,
            refreshed: None,
        }
    }
}

pub struct BookingDetailView {
    ctx: ViewContext,
    booking_id: i64,
}

impl BookingDetailView {
    pub fn new(ctx: ViewContext, booking_id: i64) -> Self {
        Self { ctx, booking_id }
    }

    fn key(&self) -> QueryKey {
        QueryKey::Booking(self.booking_id)
    }

    #[tracing::instrument(skip(self), fields(booking_id = self.booking_id))]
    pub async fn load(&self) -> Result<BookingDetail, ApiError> {
        let role = self.ctx.require_role()?;
        let client = &self.ctx.client;
        let id = self.booking_id;
        let booking = self
            .ctx
            .cache
            .fetch(self.key(), || async move { client.booking(id).await })
            .await?;
        Ok(BookingDetail::new(booking, role))
    }

    /// Runs `action` if the current booking offers it, then invalidates and
    /// refetches. Failures leave the cache untouched.
    #[tracing::instrument(skip(self, input), fields(booking_id = self.booking_id))]
    pub async fn perform(&self, action: BookingAction, input: ActionInput) -> ActionOutcome {
        let fallback = action.failure_message();

        let detail = match self.load().await {
            Ok(detail) => detail,
            Err(e) => return ActionOutcome::failed(Notification::from_error(&e, fallback)),
        };
        if !detail.actions.contains(action) {
            tracing::debug!(status = %detail.booking.booking_status, "action not offered");
            return ActionOutcome::failed(Notification::error(format!(
                "{} is not available for a {} booking",
                action.label(),
                detail.booking.booking_status.label().to_lowercase()
            )));
        }

        let result = match action {
            BookingAction::Review => {
                let rating = input.rating.unwrap_or(DEFAULT_REVIEW_RATING);
                let Some(review) = ReviewRequest::new(rating, input.review_text) else {
                    return ActionOutcome::failed(Notification::error(format!(
                        "Rating must be between {} and {}",
                        ReviewRequest::MIN_RATING,
                        ReviewRequest::MAX_RATING
                    )));
                };
                self.ctx
                    .client
                    .add_review(self.booking_id, &review)
                    .await
                    .map(|_| ())
            }
            _ => match status_update(action, input) {
                Some(update) => self
                    .ctx
                    .client
                    .update_booking_status(self.booking_id, &update)
                    .await
                    .map(|_| ()),
                None => Ok(()),
            },
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "booking action failed");
            return ActionOutcome::failed(Notification::from_error(&e, fallback));
        }

        self.ctx.cache.invalidate_bookings();
        let refreshed = match self.load().await {
            Ok(detail) => Some(detail),
            Err(e) => {
                tracing::warn!(error = %e, "refetch after action failed");
                None
            }
        };

        ActionOutcome {
            notification: Notification::success(action.success_message()),
            refreshed,
        }
    }

    pub async fn submit_review(&self, rating: u8, text: Option<String>) -> ActionOutcome {
        let input = ActionInput {
            rating: Some(rating),
            review_text: text,
            ..ActionInput::default()
        };
        self.perform(BookingAction::Review, input).await
    }

    pub async fn cancel(&self, reason: Option<String>) -> ActionOutcome {
        let input = ActionInput {
            reason,
            ..ActionInput::default()
        };
        self.perform(BookingAction::Cancel, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(status: &str, rating: Option<f64>) -> Booking {
        let mut json = serde_json::json!({
            "bookingId": 5,
            "bookingNumber": "HL0005",
            "scheduledDate": "2025-06-16",
            "scheduledTime": "10:00",
            "serviceAddress": "4 Hill Street",
            "servicePincode": "560002",
            "estimatedAmount": 300.0,
            "travelCharge": 50.0,
            "bookingStatus": status,
            "service": {"serviceId": 1, "serviceName": "Pipe Leak Fix", "categoryName": "Plumbing"},
            "provider": {"providerId": 2, "businessName": "FlowFix", "phone": "9000000002"},
            "customer": {"userId": 9, "name": "Meera", "phone": "9000000009", "email": "meera@example.com"}
        });
        if let Some(r) = rating {
            json["userRating"] = serde_json::json!(r);
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_provider_sees_customer_contact() {
        let detail = BookingDetail::new(booking("PENDING", None), ViewerRole::Provider);
        let text = detail.to_string();
        assert!(text.contains("Customer:  Meera"));
        assert!(text.contains("meera@example.com"));
        assert!(!text.contains("FlowFix"));
        assert!(text.contains("Accept Request"));
        assert!(text.contains("Reject Request"));
    }

    #[test]
    fn test_customer_sees_provider() {
        let detail = BookingDetail::new(booking("CONFIRMED", None), ViewerRole::Customer);
        let text = detail.to_string();
        assert!(text.contains("Provider:  FlowFix"));
        assert!(!text.contains("Meera"));
        assert!(text.contains("Cancel Booking"));
        assert!(text.contains("Travel: ₹50.00"));
    }

    #[test]
    fn test_admin_sees_both_without_email() {
        let text = BookingDetail::new(booking("ACCEPTED", None), ViewerRole::Admin).to_string();
        assert!(text.contains("FlowFix"));
        assert!(text.contains("Meera"));
        assert!(!text.contains("meera@example.com"));
    }

    #[test]
    fn test_rated_completed_booking_has_no_actions() {
        let detail = BookingDetail::new(booking("COMPLETED", Some(4.0)), ViewerRole::Customer);
        assert!(detail.actions.is_empty());
        assert!(!detail.to_string().contains("Actions:"));
    }

    #[test]
    fn test_status_label_in_header() {
        let text = BookingDetail::new(booking("IN_PROGRESS", None), ViewerRole::Customer).to_string();
        assert!(text.starts_with("Booking #HL0005  [IN PROGRESS]"));
    }
}
