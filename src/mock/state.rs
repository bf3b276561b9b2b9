use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Duration, NaiveDate, Utc};

use crate::models::{
    Booking, BookingStatus, Category, CustomerInfo, Provider, ProviderInfo, ServiceItem,
    ServiceSummary, TokenPair, UserProfile,
};
use crate::policy::ViewerRole;

pub const SEED_PASSWORD: &str = "password";

#[derive(Debug, Clone)]
pub struct MockUser {
    pub profile: UserProfile,
    pub password: String,
    /// Set for provider accounts.
    pub provider_id: Option<i64>,
}

impl MockUser {
    pub fn role(&self) -> Option<ViewerRole> {
        self.profile.role()
    }

    pub fn is_customer_of(&self, booking: &Booking) -> bool {
        booking
            .customer
            .as_ref()
            .is_some_and(|c| c.user_id == self.profile.user_id)
    }

    pub fn is_provider_of(&self, booking: &Booking) -> bool {
        match (self.provider_id, booking.provider.as_ref()) {
            (Some(id), Some(p)) => p.provider_id == id,
            _ => false,
        }
    }

    pub fn can_see(&self, booking: &Booking) -> bool {
        self.role() == Some(ViewerRole::Admin)
            || self.is_customer_of(booking)
            || self.is_provider_of(booking)
    }
}

#[derive(Debug, Default)]
pub struct MockData {
    pub users: Vec<MockUser>,
    pub access_tokens: HashMap<String, i64>,
    pub refresh_tokens: HashMap<String, i64>,
    pub categories: Vec<Category>,
    pub services: Vec<ServiceItem>,
    pub providers: Vec<Provider>,
    pub bookings: Vec<Booking>,
    next_booking_id: i64,
    next_review_id: i64,
}

impl MockData {
    pub fn user(&self, user_id: i64) -> Option<&MockUser> {
        self.users.iter().find(|u| u.profile.user_id == user_id)
    }

    pub fn find_login(&self, login: &str) -> Option<&MockUser> {
        self.users.iter().find(|u| {
            u.profile.email.as_deref() == Some(login) || u.profile.phone.as_deref() == Some(login)
        })
    }

    pub fn booking_mut(&mut self, booking_id: i64) -> Option<&mut Booking> {
        self.bookings.iter_mut().find(|b| b.booking_id == booking_id)
    }

    /// Issues a fresh pair for `user_id`.
    pub fn issue_tokens(&mut self, user_id: i64) -> TokenPair {
        let tokens = TokenPair {
            access_token: uuid::Uuid::new_v4().to_string(),
            refresh_token: uuid::Uuid::new_v4().to_string(),
        };
        self.access_tokens.insert(tokens.access_token.clone(), user_id);
        self.refresh_tokens.insert(tokens.refresh_token.clone(), user_id);
        tokens
    }

    pub fn allocate_booking_id(&mut self) -> i64 {
        self.next_booking_id += 1;
        self.next_booking_id
    }

    pub fn next_review_id(&mut self) -> i64 {
        self.next_review_id += 1;
        self.next_review_id
    }

    pub fn add_user(&mut self, profile: UserProfile, password: &str) -> &MockUser {
        self.users.push(MockUser {
            profile,
            password: password.to_string(),
            provider_id: None,
        });
        &self.users[self.users.len() - 1]
    }

    pub fn next_user_id(&self) -> i64 {
        self.users.iter().map(|u| u.profile.user_id).max().unwrap_or(0) + 1
    }

    pub fn push_booking(&mut self, booking: Booking) {
        self.next_booking_id = self.next_booking_id.max(booking.booking_id);
        self.bookings.push(booking);
    }
}

/// In-memory backend state plus the knobs tests use to force auth failures.
#[derive(Debug, Default)]
pub struct MockState {
    data: Mutex<MockData>,
    refresh_calls: AtomicUsize,
    reject_all_access: AtomicBool,
    fail_refresh: AtomicBool,
    requests: Mutex<HashMap<String, usize>>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let state = Self::new();
        seed(&mut state.data());
        state
    }

    pub fn data(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidates every access token issued so far. Refresh tokens stay valid.
    pub fn expire_access_tokens(&self) {
        self.data().access_tokens.clear();
    }

    /// Makes every authenticated endpoint answer 401, even for fresh tokens.
    pub fn reject_all_access(&self, on: bool) {
        self.reject_all_access.store(on, Ordering::SeqCst);
    }

    pub fn fail_refresh(&self, on: bool) {
        self.fail_refresh.store(on, Ordering::SeqCst);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn record_refresh(&self) -> bool {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        !self.fail_refresh.load(Ordering::SeqCst)
    }

    /// Requests served for `path`, counted before routing.
    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn record_request(&self, path: &str) {
        *self
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default() += 1;
    }

    pub(crate) fn access_rejected(&self) -> bool {
        self.reject_all_access.load(Ordering::SeqCst)
    }

    pub fn booking(&self, booking_id: i64) -> Option<Booking> {
        self.data()
            .bookings
            .iter()
            .find(|b| b.booking_id == booking_id)
            .cloned()
    }

    /// Inserts `booking` as-is. Handy for putting a booking in a given status.
    pub fn insert_booking(&self, booking: Booking) {
        let mut data = self.data();
        data.bookings.retain(|b| b.booking_id != booking.booking_id);
        data.push_booking(booking);
    }
}

fn profile(user_id: i64, name: &str, email: &str, phone: &str, user_type: &str) -> UserProfile {
    UserProfile {
        user_id,
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
        user_type: user_type.to_string(),
        profile_image_url: None,
    }
}

pub const CUSTOMER_EMAIL: &str = "asha@example.com";
pub const PROVIDER_EMAIL: &str = "ravi@example.com";
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Seeded booking ids, one per interesting status.
pub const PENDING_BOOKING: i64 = 1;
pub const CONFIRMED_BOOKING: i64 = 2;
pub const IN_PROGRESS_BOOKING: i64 = 3;
pub const COMPLETED_BOOKING: i64 = 4;
pub const CANCELLED_BOOKING: i64 = 5;

fn seed(data: &mut MockData) {
    let customer = profile(1, "Asha Rao", CUSTOMER_EMAIL, "9876500001", "CUSTOMER");
    let provider_user = profile(2, "Ravi Kumar", PROVIDER_EMAIL, "9876500002", "PROVIDER");
    let admin = profile(3, "Admin", ADMIN_EMAIL, "9876500003", "ADMIN");

    for (user, provider_id) in [(customer.clone(), None), (provider_user.clone(), Some(1)), (admin, None)] {
        data.users.push(MockUser {
            profile: user,
            password: SEED_PASSWORD.to_string(),
            provider_id,
        });
    }

    data.categories = [
        (1, "Electrician", "electrician"),
        (2, "Plumbing", "plumbing"),
        (3, "Cleaning", "cleaning"),
        (4, "Carpentry", "carpentry"),
        (5, "Painting", "painting"),
        (6, "Appliance Repair", "appliance-repair"),
        (7, "Pest Control", "pest-control"),
        (8, "Salon at Home", "salon-at-home"),
        (9, "Gardening", "gardening"),
    ]
    .into_iter()
    .map(|(id, name, slug)| Category {
        category_id: id,
        category_name: name.to_string(),
        category_slug: slug.to_string(),
        service_count: Some(if id == 1 { 1 } else { 0 }),
        ..Category::default()
    })
    .collect();

    let provider = Provider {
        provider_id: 1,
        business_name: Some("Ravi Electricals".to_string()),
        provider_name: Some(provider_user.name.clone()),
        phone: provider_user.phone.clone(),
        experience_years: Some(8),
        average_rating: Some(4.6),
        total_reviews: Some(37),
        completed_bookings: Some(120),
        service_categories: vec!["Electrician".to_string()],
        ..Provider::default()
    };
    data.providers = vec![provider.clone()];

    let service = ServiceItem {
        service_id: 1,
        service_name: "Fan Repair".to_string(),
        service_description: Some("Ceiling and table fan diagnosis and repair".to_string()),
        base_price: Some(299.0),
        price_type: Some("FIXED".to_string()),
        estimated_duration_minutes: Some(60),
        average_rating: Some(4.5),
        total_reviews: Some(21),
        service_highlights: vec!["Same-day visit".to_string(), "30-day warranty".to_string()],
        category: data.categories.first().cloned(),
        provider: Some(provider.clone()),
        ..ServiceItem::default()
    };
    data.services = vec![service.clone()];

    let today = Utc::now().date_naive();
    let statuses = [
        (PENDING_BOOKING, BookingStatus::Pending, today + Duration::days(3)),
        (CONFIRMED_BOOKING, BookingStatus::Confirmed, today + Duration::days(1)),
        (IN_PROGRESS_BOOKING, BookingStatus::InProgress, today),
        (COMPLETED_BOOKING, BookingStatus::Completed, today - Duration::days(5)),
        (CANCELLED_BOOKING, BookingStatus::Cancelled, today - Duration::days(2)),
    ];
    for (id, status, date) in statuses {
        let mut booking = seed_booking(id, status, date, &service, &provider, &customer);
        if status == BookingStatus::Cancelled {
            booking.cancelled_by = Some(crate::models::CancelledBy::User);
            booking.cancellation_reason = Some("Plans changed".to_string());
            booking.cancelled_at = Some(Utc::now().naive_utc() - Duration::days(3));
        }
        if status == BookingStatus::Completed {
            booking.work_summary = Some("Replaced capacitor".to_string());
            booking.final_amount = Some(349.0);
        }
        data.push_booking(booking);
    }
}

pub fn seed_booking(
    booking_id: i64,
    status: BookingStatus,
    date: NaiveDate,
    service: &ServiceItem,
    provider: &Provider,
    customer: &UserProfile,
) -> Booking {
    let created = Utc::now().naive_utc() - Duration::days(10) + Duration::hours(booking_id);
    Booking {
        booking_id,
        booking_number: format!("HL{}{booking_id:04}", date.format("%y%m%d")),
        scheduled_date: date,
        scheduled_time: "10:00".to_string(),
        scheduled_end_time: None,
        service_address: "12 Lake Road, Indiranagar".to_string(),
        service_landmark: Some("Opposite City Park".to_string()),
        service_pincode: "560038".to_string(),
        issue_title: Some("Fan not spinning".to_string()),
        issue_description: Some("Ceiling fan hums but does not spin".to_string()),
        issue_images: Vec::new(),
        urgency_level: Some("NORMAL".to_string()),
        estimated_amount: service.base_price,
        material_cost: None,
        labor_cost: None,
        travel_charge: Some(50.0),
        discount_amount: None,
        tax_amount: None,
        final_amount: None,
        booking_status: status,
        payment_status: Some("PENDING".to_string()),
        cancelled_by: None,
        cancellation_reason: None,
        cancelled_at: None,
        provider_notes: None,
        work_summary: None,
        user_rating: None,
        created_at: Some(created),
        updated_at: Some(created),
        service: Some(ServiceSummary {
            service_id: service.service_id,
            service_name: service.service_name.clone(),
            base_price: service.base_price,
            price_type: service.price_type.clone(),
            estimated_duration_minutes: service.estimated_duration_minutes,
            category_name: service.category.as_ref().map(|c| c.category_name.clone()),
            category_icon: None,
        }),
        provider: Some(ProviderInfo {
            provider_id: provider.provider_id,
            business_name: provider.business_name.clone(),
            provider_name: provider.provider_name.clone(),
            phone: provider.phone.clone(),
            profile_image_url: None,
            average_rating: provider.average_rating,
            completed_bookings: provider.completed_bookings.map(|n| n as i32),
        }),
        customer: Some(CustomerInfo {
            user_id: customer.user_id,
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            profile_image_url: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_state() {
        let state = MockState::seeded();
        let data = state.data();
        assert_eq!(data.users.len(), 3);
        assert!(data.categories.len() > 8);
        assert_eq!(data.bookings.len(), 5);
        assert!(data.find_login(CUSTOMER_EMAIL).is_some());
        assert!(data.find_login("9876500002").is_some());
    }

    #[test]
    fn test_expire_access_tokens_keeps_refresh() {
        let state = MockState::seeded();
        let tokens = state.data().issue_tokens(1);
        state.expire_access_tokens();
        let data = state.data();
        assert!(!data.access_tokens.contains_key(&tokens.access_token));
        assert_eq!(data.refresh_tokens.get(&tokens.refresh_token), Some(&1));
    }

    #[test]
    fn test_ownership() {
        let state = MockState::seeded();
        let data = state.data();
        let booking = &data.bookings[0];
        assert!(data.user(1).unwrap().is_customer_of(booking));
        assert!(data.user(2).unwrap().is_provider_of(booking));
        assert!(data.user(3).unwrap().can_see(booking));
        assert!(!data.user(1).unwrap().is_provider_of(booking));
    }
}
