use crate::error::Result;
use crate::http_client::{GatewayClient, GetOptions, RequestConfig};
use crate::models::{Booking, CreateBookingRequest};

use super::validate_id;

const CUSTOMER_BOOKINGS_PATH: &str = "/customer/bookings";

#[derive(Debug, Clone)]
pub struct BookingService {
    client: GatewayClient,
}

impl BookingService {
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }

    /// The signed-in customer's bookings; never cached, status changes often
    pub async fn list(&self) -> Result<Vec<Booking>> {
        let response = self
            .client
            .get::<Vec<Booking>>(CUSTOMER_BOOKINGS_PATH, GetOptions::new())
            .await?;
        Ok(response.into_data())
    }

    pub async fn create(&self, request: &CreateBookingRequest) -> Result<Booking> {
        validate_id("service", &request.service_id)?;

        let response = self
            .client
            .post::<Booking, _>(CUSTOMER_BOOKINGS_PATH, Some(request), RequestConfig::new())
            .await?;
        let booking = response.into_data();

        tracing::info!(
            booking_id = %booking.id,
            service_id = %booking.service_id,
            status = %booking.status,
            "Booking created"
        );
        Ok(booking)
    }
}
