pub mod auth;
pub mod booking;
pub mod catalog;
pub mod envelope;
pub mod payment;
pub mod provider;
pub mod user;

pub use auth::{
    AuthResponse, ChangePasswordRequest, GoogleLoginRequest, LoginRequest, OtpRequest,
    RefreshRequest, RegisterRequest, SetPasswordRequest, TokenPair, VerifyOtpRequest,
};
pub use booking::{
    Booking, BookingList, BookingStatus, CancelledBy, CreateBookingRequest, CustomerInfo,
    ProviderInfo, ReviewRequest, ServiceSummary, StatusUpdate,
};
pub use catalog::{Category, Paged, ServiceItem};
pub use envelope::Envelope;
pub use payment::{CreateOrderRequest, CreateOrderResponse, Payment, VerifyPaymentRequest};
pub use provider::Provider;
pub use user::{Address, UpdateProfileRequest, UserProfile};
