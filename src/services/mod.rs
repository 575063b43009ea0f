// Typed wrappers over the gateway, one per backend resource

mod auth;
mod bookings;
mod catalog;

pub use auth::AuthService;
pub use bookings::BookingService;
pub use catalog::{CatalogService, ServiceQuery, DEFAULT_PROVIDER_LIMIT};

use crate::error::{ErrorKind, HttpError, Result};

/// Reject ids that would break out of their path segment
fn validate_id<'a>(what: &str, id: &'a str) -> Result<&'a str> {
    let id = id.trim();
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(id)
    } else {
        Err(HttpError::new(
            ErrorKind::TransportFailure,
            format!("Invalid {} id: '{}'", what, id),
            0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert_eq!(
            validate_id("service", " 2adba3b8-3d18-4b16-b371-0359b6a5f6ba ").unwrap(),
            "2adba3b8-3d18-4b16-b371-0359b6a5f6ba"
        );
        assert!(validate_id("service", "").is_err());
        assert!(validate_id("service", "../admin").is_err());
        assert!(validate_id("service", "a?b=c").is_err());

        let err = validate_id("service", "a/b").unwrap_err();
        assert_eq!(err.status, 0);
        assert_eq!(err.kind, ErrorKind::TransportFailure);
    }
}
