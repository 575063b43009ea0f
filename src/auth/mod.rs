// Authentication module
// Credential storage and session-expiry notification

mod observer;
mod store;
mod types;

pub use observer::{ObserverGuard, ObserverSlot, SessionObserver};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use types::{redact, Credentials, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
