// ServEase client - Library root

pub mod auth;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod services;

pub use error::{ErrorKind, HttpError};
pub use http_client::{ApiResponse, CacheHint, GatewayClient, GetOptions, RequestConfig};
