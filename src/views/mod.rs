//! View models for the marketplace screens.
//!
//! Views read through the [`QueryCache`], compute what the viewer may do via
//! [`crate::policy`], and turn write results into [`Notification`]s. Errors
//! from writes never escape a view; the last fetched data stays in place.

pub mod booking_detail;
pub mod bookings;
pub mod home;
pub mod service_detail;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::errors::ApiError;
use crate::policy::ViewerRole;

pub use booking_detail::{ActionOutcome, BookingDetail, BookingDetailView};
pub use bookings::{BookingListModel, BookingListView, BookingRow, StatusFilter};
pub use home::{HomeFeed, HomeView, HOME_CATEGORY_LIMIT, HOME_PROVIDER_LIMIT};
pub use service_detail::{ServiceCard, ServiceDetailView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    /// Credentials are gone; the user has to log in again.
    LoginRequired,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn from_error(err: &ApiError, fallback: &str) -> Self {
        let kind = if err.requires_login() {
            NoticeKind::LoginRequired
        } else {
            NoticeKind::Error
        };
        Self {
            kind,
            message: err.user_message(fallback),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            NoticeKind::Success => write!(f, "✓ {}", self.message),
            NoticeKind::Error => write!(f, "✗ {}", self.message),
            NoticeKind::LoginRequired => write!(f, "! {} (run `hirelink login`)", self.message),
        }
    }
}

/// What every view needs: the client and the shared cache.
#[derive(Clone)]
pub struct ViewContext {
    pub client: Arc<ApiClient>,
    pub cache: Arc<QueryCache>,
}

impl ViewContext {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            cache: Arc::new(QueryCache::new()),
        }
    }

    pub fn role(&self) -> Option<ViewerRole> {
        self.client.session().role()
    }

    pub(crate) fn require_role(&self) -> Result<ViewerRole, ApiError> {
        self.role().ok_or(ApiError::Unauthenticated)
    }
}

pub(crate) fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub(crate) fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub(crate) fn money(amount: f64) -> String {
    format!("₹{amount:.2}")
}
