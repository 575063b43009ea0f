use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Lifecycle state of a booking; unrecognized values are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Completed,
    Cancelled,
    Other(String),
}

impl BookingStatus {
    /// Case-insensitive parse of the backend status string
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "PENDING" => BookingStatus::Pending,
            "COMPLETED" => BookingStatus::Completed,
            "CANCELLED" => BookingStatus::Cancelled,
            _ => BookingStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Other(raw) => raw,
        }
    }

    /// Whether the booking can still change
    pub fn is_open(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BookingStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BookingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(BookingStatus::parse(raw.as_deref().unwrap_or_default()))
    }
}

// ==================================================================================================
// Models for POST /customer/bookings
// ==================================================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub service_id: String,
    #[serde(serialize_with = "serialize_schedule")]
    pub schedule: DateTime<Utc>,
    pub address: String,
}

fn serialize_schedule<S: Serializer>(
    schedule: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&schedule.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ==================================================================================================
// Models for GET /customer/bookings
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingServiceRef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayment {
    pub id: String,
    pub booking_id: String,
    pub amount: String,
    pub currency: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingParty {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<BookingServiceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<BookingParty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<BookingParty>,
    pub schedule: String,
    #[serde(default)]
    pub address: String,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<BookingPayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Booking {
    /// Parsed schedule, `None` when the backend sent something other than RFC 3339
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.schedule)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(BookingStatus::parse("pending"), BookingStatus::Pending);
        assert_eq!(BookingStatus::parse("Completed"), BookingStatus::Completed);
        assert_eq!(BookingStatus::parse("CANCELLED"), BookingStatus::Cancelled);
        assert_eq!(
            BookingStatus::parse("in_progress"),
            BookingStatus::Other("in_progress".to_string())
        );
        assert!(BookingStatus::Pending.is_open());
        assert!(!BookingStatus::Cancelled.is_open());
    }

    #[test]
    fn test_create_request_wire_shape() {
        let req = CreateBookingRequest {
            service_id: "svc-1".to_string(),
            schedule: Utc.with_ymd_and_hms(2025, 11, 3, 9, 30, 0).unwrap(),
            address: "12 Rizal St, Makati".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            json!({
                "serviceId": "svc-1",
                "schedule": "2025-11-03T09:30:00.000Z",
                "address": "12 Rizal St, Makati"
            })
        );
    }

    #[test]
    fn test_booking_deserializes_backend_shape() {
        let booking: Booking = serde_json::from_value(json!({
            "id": "bk-1",
            "serviceId": "svc-1",
            "service": {"id": "svc-1", "title": "Aircon Cleaning", "price": "1500.00"},
            "schedule": "2025-11-03T09:30:00.000Z",
            "address": "12 Rizal St",
            "status": "pending",
            "payment": {
                "id": "pay-1",
                "bookingId": "bk-1",
                "amount": "1500.00",
                "currency": "PHP",
                "status": "UNPAID",
                "paymentIntentId": null
            }
        }))
        .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.service.as_ref().unwrap().title, "Aircon Cleaning");
        assert_eq!(booking.payment.as_ref().unwrap().currency, "PHP");
        assert_eq!(
            booking.scheduled_at(),
            Some(Utc.with_ymd_and_hms(2025, 11, 3, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_null_status_is_preserved_as_other() {
        let booking: Booking = serde_json::from_value(json!({
            "id": "bk-1",
            "serviceId": "svc-1",
            "schedule": "tomorrow",
            "status": null
        }))
        .unwrap();
        assert_eq!(booking.status, BookingStatus::Other(String::new()));
        assert!(booking.scheduled_at().is_none());
    }
}
