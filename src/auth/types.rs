// Authentication types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage key for the access token
pub const ACCESS_TOKEN_KEY: &str = "auth_access_token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "auth_refresh_token";

/// The single active credential pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "auth_access_token")]
    pub access_token: String,
    #[serde(rename = "auth_refresh_token")]
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

/// Short, log-safe preview of a token
///
/// Shows at most six characters and never more than half the token.
pub fn redact(token: &str) -> String {
    let len = token.chars().count();
    if len == 0 {
        return "<empty>".to_string();
    }
    let shown = (len / 2).min(6);
    if shown == 0 {
        return "...".to_string();
    }
    let prefix: String = token.chars().take(shown).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_does_not_leak_tokens() {
        let creds = Credentials::new("eyJhbGciOiJIUzI1NiJ9.secret", "refresh-secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("eyJhbG..."));
    }

    #[test]
    fn test_serialized_keys() {
        let creds = Credentials::new("abc", "def");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json[ACCESS_TOKEN_KEY], "abc");
        assert_eq!(json[REFRESH_TOKEN_KEY], "def");
    }

    #[test]
    fn test_redact_short_and_empty() {
        assert_eq!(redact(""), "<empty>");
        assert_eq!(redact("abc"), "a...");
        assert_eq!(redact("x"), "...");
    }

    #[test]
    fn test_redact_never_reveals_short_tokens() {
        assert_eq!(redact("abcdef"), "abc...");
        assert_eq!(redact("abcdefghijklmnop"), "abcdef...");
        for token in ["a", "ab", "abc", "abcd", "abcdef", "abcdefghijkl"] {
            assert!(!redact(token).contains(token));
        }
    }
}
