use super::{ApiClient, ApiRequest};
use crate::errors::ApiError;
use crate::models::{CreateOrderRequest, CreateOrderResponse, Payment, VerifyPaymentRequest};

impl ApiClient {
    pub async fn create_payment_order(
        &self,
        booking_id: i64,
    ) -> Result<CreateOrderResponse, ApiError> {
        self.fetch(ApiRequest::post("/payments/create-order").json(&CreateOrderRequest { booking_id })?)
            .await
    }

    pub async fn verify_payment(&self, body: &VerifyPaymentRequest) -> Result<Payment, ApiError> {
        self.fetch(ApiRequest::post("/payments/verify").json(body)?)
            .await
    }

    pub async fn payment_for_booking(&self, booking_id: i64) -> Result<Payment, ApiError> {
        self.fetch(ApiRequest::get(format!("/payments/booking/{booking_id}")))
            .await
    }
}
