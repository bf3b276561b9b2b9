//! Which booking actions a viewer is offered.
//!
//! The server owns the booking lifecycle and rejects invalid transitions; this
//! module only decides what to offer, as a pure function of the current status,
//! the viewer's role and whether the booking already carries a rating. Every
//! view goes through [`allowed_actions`] instead of deriving its own flags.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Booking, BookingStatus, StatusUpdate};

pub const DEFAULT_REJECT_REASON: &str = "Service unavailable";
pub const DEFAULT_WORK_SUMMARY: &str = "Service completed successfully";
pub const DEFAULT_REVIEW_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewerRole {
    Customer,
    Provider,
    Admin,
}

impl ViewerRole {
    pub const ALL: [ViewerRole; 3] = [ViewerRole::Customer, ViewerRole::Provider, ViewerRole::Admin];

    /// Maps the server's `userType`. `SUPER_ADMIN` collapses into `Admin`.
    pub fn parse(user_type: &str) -> Option<Self> {
        match user_type.trim().to_ascii_uppercase().as_str() {
            "CUSTOMER" => Some(ViewerRole::Customer),
            "PROVIDER" => Some(ViewerRole::Provider),
            "ADMIN" | "SUPER_ADMIN" => Some(ViewerRole::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerRole::Customer => "CUSTOMER",
            ViewerRole::Provider => "PROVIDER",
            ViewerRole::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BookingAction {
    Accept,
    Reject,
    Confirm,
    Start,
    Complete,
    Review,
    Cancel,
}

impl BookingAction {
    pub const ALL: [BookingAction; 7] = [
        BookingAction::Accept,
        BookingAction::Reject,
        BookingAction::Confirm,
        BookingAction::Start,
        BookingAction::Complete,
        BookingAction::Review,
        BookingAction::Cancel,
    ];

    /// Status requested by this action. Reviews go through their own endpoint.
    pub fn target_status(self) -> Option<BookingStatus> {
        match self {
            BookingAction::Accept => Some(BookingStatus::Accepted),
            BookingAction::Reject => Some(BookingStatus::Rejected),
            BookingAction::Confirm => Some(BookingStatus::Confirmed),
            BookingAction::Start => Some(BookingStatus::InProgress),
            BookingAction::Complete => Some(BookingStatus::Completed),
            BookingAction::Cancel => Some(BookingStatus::Cancelled),
            BookingAction::Review => None,
        }
    }

    /// Provider actions that move a booking forward.
    pub fn is_progression(self) -> bool {
        matches!(
            self,
            BookingAction::Accept
                | BookingAction::Reject
                | BookingAction::Confirm
                | BookingAction::Start
                | BookingAction::Complete
        )
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Some(BookingAction::Accept),
            "reject" => Some(BookingAction::Reject),
            "confirm" => Some(BookingAction::Confirm),
            "start" => Some(BookingAction::Start),
            "complete" => Some(BookingAction::Complete),
            "review" => Some(BookingAction::Review),
            "cancel" => Some(BookingAction::Cancel),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingAction::Accept => "accept",
            BookingAction::Reject => "reject",
            BookingAction::Confirm => "confirm",
            BookingAction::Start => "start",
            BookingAction::Complete => "complete",
            BookingAction::Review => "review",
            BookingAction::Cancel => "cancel",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BookingAction::Accept => "Accept Request",
            BookingAction::Reject => "Reject Request",
            BookingAction::Confirm => "Confirm Booking",
            BookingAction::Start => "Start Service",
            BookingAction::Complete => "Complete Service",
            BookingAction::Review => "Write a Review",
            BookingAction::Cancel => "Cancel Booking",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            BookingAction::Accept => "Booking accepted!",
            BookingAction::Reject => "Booking rejected",
            BookingAction::Confirm => "Booking confirmed!",
            BookingAction::Start => "Service started!",
            BookingAction::Complete => "Service completed!",
            BookingAction::Review => "Review submitted successfully",
            BookingAction::Cancel => "Booking cancelled successfully",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            BookingAction::Review => "Failed to submit review",
            BookingAction::Cancel => "Failed to cancel booking",
            _ => "Failed to update status",
        }
    }
}

impl std::fmt::Display for BookingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet(BTreeSet<BookingAction>);

impl ActionSet {
    pub fn contains(&self, action: BookingAction) -> bool {
        self.0.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = BookingAction> + '_ {
        self.0.iter().copied()
    }

    /// Only the status-advancing provider actions.
    pub fn progressions(&self) -> ActionSet {
        self.iter().filter(|a| a.is_progression()).collect()
    }
}

impl FromIterator<BookingAction> for ActionSet {
    fn from_iter<I: IntoIterator<Item = BookingAction>>(iter: I) -> Self {
        ActionSet(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[BookingAction; N]> for ActionSet {
    fn from(actions: [BookingAction; N]) -> Self {
        actions.into_iter().collect()
    }
}

pub fn allowed_actions(status: BookingStatus, role: ViewerRole, has_rating: bool) -> ActionSet {
    let mut actions = BTreeSet::new();

    if role == ViewerRole::Provider {
        match status {
            BookingStatus::Pending => {
                actions.insert(BookingAction::Accept);
                actions.insert(BookingAction::Reject);
            }
            BookingStatus::Accepted => {
                actions.insert(BookingAction::Confirm);
            }
            BookingStatus::Confirmed => {
                actions.insert(BookingAction::Start);
            }
            BookingStatus::InProgress => {
                actions.insert(BookingAction::Complete);
            }
            _ => {}
        }
    }

    if role == ViewerRole::Customer && status == BookingStatus::Completed && !has_rating {
        actions.insert(BookingAction::Review);
    }

    // Cancellation stops at IN_PROGRESS whoever is looking.
    if matches!(
        status,
        BookingStatus::Pending | BookingStatus::Accepted | BookingStatus::Confirmed
    ) {
        actions.insert(BookingAction::Cancel);
    }

    ActionSet(actions)
}

impl Booking {
    pub fn available_actions(&self, role: ViewerRole) -> ActionSet {
        allowed_actions(self.booking_status, role, self.has_rating())
    }
}

/// Inputs collected before an action is sent.
#[derive(Debug, Clone, Default)]
pub struct ActionInput {
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub work_summary: Option<String>,
    pub final_amount: Option<f64>,
    pub rating: Option<u8>,
    pub review_text: Option<String>,
}

impl ActionInput {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_work_summary(summary: impl Into<String>) -> Self {
        Self {
            work_summary: Some(summary.into()),
            ..Self::default()
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builds the status-update body for `action`. `None` for reviews.
pub fn status_update(action: BookingAction, input: ActionInput) -> Option<StatusUpdate> {
    let mut update = StatusUpdate::new(action.target_status()?);
    match action {
        BookingAction::Reject => {
            update.reason =
                Some(non_blank(input.reason).unwrap_or_else(|| DEFAULT_REJECT_REASON.to_string()));
        }
        BookingAction::Complete => {
            update.work_summary = Some(
                non_blank(input.work_summary).unwrap_or_else(|| DEFAULT_WORK_SUMMARY.to_string()),
            );
            update.final_amount = input.final_amount;
        }
        BookingAction::Cancel => {
            update.reason = non_blank(input.reason);
        }
        BookingAction::Accept | BookingAction::Confirm => {
            update.notes = non_blank(input.notes);
        }
        BookingAction::Start | BookingAction::Review => {}
    }
    Some(update)
}

/// Which parties' details a viewer gets to see on a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub provider: bool,
    pub customer: bool,
    pub customer_email: bool,
}

impl Visibility {
    pub fn for_role(role: ViewerRole) -> Self {
        match role {
            ViewerRole::Provider => Visibility {
                provider: false,
                customer: true,
                customer_email: true,
            },
            ViewerRole::Customer => Visibility {
                provider: true,
                customer: false,
                customer_email: false,
            },
            ViewerRole::Admin => Visibility {
                provider: true,
                customer: true,
                customer_email: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use BookingAction::*;

    fn table(status: BookingStatus, role: ViewerRole) -> ActionSet {
        match (status, role) {
            (BookingStatus::Pending, ViewerRole::Provider) => [Accept, Reject, Cancel].into(),
            (BookingStatus::Accepted, ViewerRole::Provider) => [Confirm, Cancel].into(),
            (BookingStatus::Confirmed, ViewerRole::Provider) => [Start, Cancel].into(),
            (BookingStatus::InProgress, ViewerRole::Provider) => [Complete].into(),
            (BookingStatus::Pending | BookingStatus::Accepted | BookingStatus::Confirmed, _) => {
                [Cancel].into()
            }
            _ => ActionSet::default(),
        }
    }

    #[test]
    fn test_matches_table_for_every_pair() {
        for status in BookingStatus::ALL {
            for role in ViewerRole::ALL {
                let mut expected = table(status, role);
                if status == BookingStatus::Completed && role == ViewerRole::Customer {
                    expected = [Review].into();
                }
                assert_eq!(
                    allowed_actions(status, role, false),
                    expected,
                    "{status} / {role}"
                );
            }
        }
    }

    #[test]
    fn test_review_only_for_unrated_completed_customer() {
        for status in BookingStatus::ALL {
            for role in ViewerRole::ALL {
                for rated in [false, true] {
                    let offered = allowed_actions(status, role, rated).contains(Review);
                    let expected =
                        status == BookingStatus::Completed && role == ViewerRole::Customer && !rated;
                    assert_eq!(offered, expected, "{status} / {role} / rated={rated}");
                }
            }
        }
    }

    #[test]
    fn test_cancel_depends_on_status_only() {
        for status in BookingStatus::ALL {
            let cancellable = matches!(
                status,
                BookingStatus::Pending | BookingStatus::Accepted | BookingStatus::Confirmed
            );
            for role in ViewerRole::ALL {
                assert_eq!(allowed_actions(status, role, false).contains(Cancel), cancellable);
            }
        }
    }

    #[test]
    fn test_terminal_statuses_offer_nothing() {
        for status in [BookingStatus::Cancelled, BookingStatus::Rejected] {
            for role in ViewerRole::ALL {
                for rated in [false, true] {
                    assert!(allowed_actions(status, role, rated).is_empty());
                }
            }
        }
    }

    #[test]
    fn test_pending_provider_progressions() {
        let actions = allowed_actions(BookingStatus::Pending, ViewerRole::Provider, false);
        assert_eq!(actions.progressions(), [Accept, Reject].into());
        let after_accept = allowed_actions(BookingStatus::Accepted, ViewerRole::Provider, false);
        assert_eq!(after_accept.progressions(), [Confirm].into());
    }

    #[test]
    fn test_in_progress_customer_cannot_cancel() {
        assert!(allowed_actions(BookingStatus::InProgress, ViewerRole::Customer, false).is_empty());
    }

    #[test]
    fn test_parse_roles() {
        assert_eq!(ViewerRole::parse("SUPER_ADMIN"), Some(ViewerRole::Admin));
        assert_eq!(ViewerRole::parse("provider"), Some(ViewerRole::Provider));
        assert_eq!(ViewerRole::parse("GUEST"), None);
    }

    #[test]
    fn test_reject_defaults_reason() {
        let update = status_update(Reject, ActionInput::default()).unwrap();
        assert_eq!(update.status, "REJECTED");
        assert_eq!(update.reason.as_deref(), Some(DEFAULT_REJECT_REASON));
    }

    #[test]
    fn test_complete_carries_summary() {
        let update = status_update(Complete, ActionInput::with_work_summary("Replaced capacitor")).unwrap();
        assert_eq!(update.status, "COMPLETED");
        assert_eq!(update.work_summary.as_deref(), Some("Replaced capacitor"));

        let defaulted = status_update(Complete, ActionInput::default()).unwrap();
        assert_eq!(defaulted.work_summary.as_deref(), Some(DEFAULT_WORK_SUMMARY));
    }

    #[test]
    fn test_cancel_reason_is_optional() {
        let update = status_update(Cancel, ActionInput::with_reason("  ")).unwrap();
        assert_eq!(update.status, "CANCELLED");
        assert!(update.reason.is_none());

        let update = status_update(Cancel, ActionInput::with_reason("plans changed")).unwrap();
        assert_eq!(update.reason.as_deref(), Some("plans changed"));
    }

    #[test]
    fn test_review_has_no_status_update() {
        assert!(status_update(Review, ActionInput::default()).is_none());
    }

    #[test]
    fn test_visibility() {
        assert!(Visibility::for_role(ViewerRole::Provider).customer_email);
        assert!(!Visibility::for_role(ViewerRole::Customer).customer);
        let admin = Visibility::for_role(ViewerRole::Admin);
        assert!(admin.provider && admin.customer && !admin.customer_email);
    }
}
