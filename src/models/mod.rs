// Data models for the marketplace backend

pub mod auth;
pub mod booking;
pub mod catalog;

pub use auth::{AuthProfile, SignInRequest, SignInResponse, Verify2faRequest, Verify2faResponse};
pub use booking::{
    Booking, BookingParty, BookingPayment, BookingServiceRef, BookingStatus, CreateBookingRequest,
};
pub use catalog::{
    ProviderKind, Service, ServiceCategory, ServiceCategoryRef, ServiceImage, ServiceProvider,
};
