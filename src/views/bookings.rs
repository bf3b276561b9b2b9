use std::fmt;

use crate::api::PageParams;
use crate::cache::QueryKey;
use crate::errors::ApiError;
use crate::models::{Booking, BookingList, BookingStatus};
use crate::policy::{ActionSet, ViewerRole};

use super::{money, short_date, ViewContext};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Status tabs on the bookings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 6] = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Confirmed,
        StatusFilter::InProgress,
        StatusFilter::Completed,
        StatusFilter::Cancelled,
    ];

    pub fn status(self) -> Option<BookingStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(BookingStatus::Pending),
            StatusFilter::Confirmed => Some(BookingStatus::Confirmed),
            StatusFilter::InProgress => Some(BookingStatus::InProgress),
            StatusFilter::Completed => Some(BookingStatus::Completed),
            StatusFilter::Cancelled => Some(BookingStatus::Cancelled),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "" | "all" => Some(StatusFilter::All),
            "pending" => Some(StatusFilter::Pending),
            "confirmed" => Some(StatusFilter::Confirmed),
            "in_progress" => Some(StatusFilter::InProgress),
            "completed" => Some(StatusFilter::Completed),
            "cancelled" => Some(StatusFilter::Cancelled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Pending => "Pending",
            StatusFilter::Confirmed => "Confirmed",
            StatusFilter::InProgress => "In Progress",
            StatusFilter::Completed => "Completed",
            StatusFilter::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingRow {
    pub booking: Booking,
    pub actions: ActionSet,
}

#[derive(Debug, Clone)]
pub struct BookingListModel {
    pub role: ViewerRole,
    pub filter: StatusFilter,
    pub rows: Vec<BookingRow>,
    pub total: i64,
}

impl BookingListModel {
    pub fn new(list: BookingList, role: ViewerRole, filter: StatusFilter) -> Self {
        let rows = list
            .bookings
            .into_iter()
            .map(|booking| BookingRow {
                actions: booking.available_actions(role),
                booking,
            })
            .collect();
        Self {
            role,
            filter,
            rows,
            total: list.total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn empty_message(&self) -> &'static str {
        if self.filter != StatusFilter::All {
            "No bookings match the selected filter"
        } else if self.role == ViewerRole::Provider {
            "You don't have any service requests yet"
        } else {
            "You haven't made any bookings yet"
        }
    }

    pub fn title(&self) -> &'static str {
        match self.role {
            ViewerRole::Provider => "Service Requests",
            _ => "My Bookings",
        }
    }
}

impl fmt::Display for BookingListModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.title(), self.filter.label())?;

        if self.is_empty() {
            return writeln!(f, "  {}", self.empty_message());
        }

        for row in &self.rows {
            let b = &row.booking;
            let counterpart = match self.role {
                ViewerRole::Provider => b.customer.as_ref().map(|c| c.name.as_str()),
                _ => b.provider.as_ref().map(|p| p.display_name()),
            }
            .unwrap_or("-");
            writeln!(
                f,
                "  [{}] #{} {:<24} {:<20} {} {} {:>10}  {}",
                b.booking_id,
                b.booking_number,
                b.service_name(),
                counterpart,
                short_date(b.scheduled_date),
                b.scheduled_time,
                money(b.total()),
                b.booking_status.label()
            )?;
            if !row.actions.is_empty() {
                let names: Vec<&str> = row.actions.iter().map(|a| a.as_str()).collect();
                writeln!(f, "      actions: {}", names.join(", "))?;
            }
        }
        writeln!(f, "  {} of {} shown", self.rows.len(), self.total)
    }
}

pub struct BookingListView {
    ctx: ViewContext,
}

impl BookingListView {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&self, filter: StatusFilter, page: u32) -> Result<BookingListModel, ApiError> {
        let role = self.ctx.require_role()?;
        let status = filter.status();
        let key = QueryKey::MyBookings {
            status,
            page,
            size: DEFAULT_PAGE_SIZE,
        };
        let client = &self.ctx.client;
        let list = self
            .ctx
            .cache
            .fetch(key, || async move {
                client
                    .my_bookings(status, &PageParams::new(page, DEFAULT_PAGE_SIZE))
                    .await
            })
            .await?;
        Ok(BookingListModel::new(list, role, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(statuses: &[&str]) -> BookingList {
        let bookings: Vec<serde_json::Value> = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                serde_json::json!({
                    "bookingId": i + 1,
                    "bookingNumber": format!("HL{:04}", i + 1),
                    "scheduledDate": "2025-07-01",
                    "scheduledTime": "09:30",
                    "estimatedAmount": 250.0,
                    "bookingStatus": status,
                    "service": {"serviceId": 1, "serviceName": "AC Service"},
                    "provider": {"providerId": 2, "businessName": "CoolAir"},
                    "customer": {"userId": 3, "name": "Kiran"}
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "bookings": bookings,
            "page": 0,
            "size": 20,
            "total": statuses.len(),
            "totalPages": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(StatusFilter::parse(""), Some(StatusFilter::All));
        assert_eq!(StatusFilter::parse("in-progress"), Some(StatusFilter::InProgress));
        assert_eq!(StatusFilter::parse("CANCELLED"), Some(StatusFilter::Cancelled));
        assert_eq!(StatusFilter::parse("accepted"), None);
        assert_eq!(StatusFilter::All.status(), None);
    }

    #[test]
    fn test_empty_messages() {
        let empty = list(&[]);
        let provider = BookingListModel::new(empty.clone(), ViewerRole::Provider, StatusFilter::All);
        assert_eq!(provider.empty_message(), "You don't have any service requests yet");

        let customer = BookingListModel::new(empty.clone(), ViewerRole::Customer, StatusFilter::All);
        assert_eq!(customer.empty_message(), "You haven't made any bookings yet");

        let filtered = BookingListModel::new(empty, ViewerRole::Customer, StatusFilter::Pending);
        assert!(filtered.to_string().contains("No bookings match the selected filter"));
    }

    #[test]
    fn test_rows_carry_role_actions() {
        let model = BookingListModel::new(
            list(&["PENDING", "IN_PROGRESS", "CANCELLED"]),
            ViewerRole::Provider,
            StatusFilter::All,
        );
        assert_eq!(model.rows.len(), 3);
        assert_eq!(model.rows[0].actions.len(), 3);
        assert_eq!(model.rows[1].actions.len(), 1);
        assert!(model.rows[2].actions.is_empty());

        let text = model.to_string();
        assert!(text.starts_with("Service Requests (All)"));
        assert!(text.contains("Kiran"));
        assert!(text.contains("actions: accept, reject, cancel"));
    }

    #[test]
    fn test_customer_rows_show_provider() {
        let model = BookingListModel::new(list(&["CONFIRMED"]), ViewerRole::Customer, StatusFilter::All);
        let text = model.to_string();
        assert!(text.contains("CoolAir"));
        assert!(!text.contains("Kiran"));
        assert!(text.contains("actions: cancel"));
    }
}
