// Error handling module
// Normalizes every transport and server failure into a single error shape

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Message shown when the request exceeded the transport timeout
pub const TIMEOUT_MESSAGE: &str =
    "The request took too long. Please check your connection and try again.";

/// Message shown when the backend could not be reached at all
pub const NETWORK_MESSAGE: &str = "Unable to reach the server. Make sure the backend is running, \
that this device is on the same network as the server, and that the API URL is configured correctly.";

/// Last-resort message when nothing better is available
pub const FALLBACK_MESSAGE: &str = "Request failed";

static TIMEOUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btimed?\s?out\b|deadline has elapsed").unwrap());

static NETWORK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)network error|connection refused|connection reset|dns error|error sending request|unreachable")
        .unwrap()
});

/// Category of a normalized failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport gave up waiting
    Timeout,

    /// No connection could be established
    NetworkUnreachable,

    /// Server answered 401; credentials were cleared before this error surfaced
    AuthenticationExpired,

    /// Server answered with a non-success status
    ServerRejected,

    /// Transport failed for another reason (bad URL, undecodable body, ...)
    TransportFailure,

    /// Nothing about the failure could be determined
    Unknown,
}

/// Normalized error returned by every gateway call
///
/// `status` is 0 only when no HTTP response reached the client.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct HttpError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: u16,
    pub data: Option<Value>,
}

impl HttpError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, status: u16) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        };

        Self {
            kind,
            message,
            status,
            data: None,
        }
    }

    /// Whether the server rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Whether a conditional GET came back 304
    pub fn is_not_modified(&self) -> bool {
        self.status == 304
    }

    /// Whether an HTTP response was received at all
    pub fn has_response(&self) -> bool {
        self.status != 0
    }
}

/// Facts collected about a failed request before it is classified
#[derive(Debug, Clone, Default)]
pub struct FailureContext {
    /// Transport reported a timeout
    pub timed_out: bool,

    /// Transport failed to connect
    pub connect_failed: bool,

    /// Transport-level error text, if any
    pub transport_message: Option<String>,

    /// HTTP status, if a response was received
    pub status: Option<u16>,

    /// Raw response payload, if any
    pub body: Option<Value>,
}

impl FailureContext {
    /// Gather the structured signals reqwest exposes plus the full error chain text
    ///
    /// The URL is stripped first so request paths never reach the text patterns.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let err = err.without_url();
        Self {
            timed_out: err.is_timeout(),
            connect_failed: err.is_connect(),
            transport_message: Some(error_chain(&err)),
            status: err.status().map(|s| s.as_u16()),
            body: None,
        }
    }

    /// A response arrived with a non-success status
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        Self {
            timed_out: false,
            connect_failed: false,
            transport_message: Some(format!("Request failed with status code {}", status)),
            status: Some(status),
            body,
        }
    }
}

/// Classify a failure into a normalized error
///
/// Message selection, first match wins: timeout, network unreachable,
/// server-supplied message, transport message, generic fallback.
pub fn classify(ctx: FailureContext) -> HttpError {
    let status = ctx.status.unwrap_or(0);
    let transport = ctx
        .transport_message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    // Text patterns are a last resort: only for transport failures with no structured
    // signal and no response
    let unlabeled = if ctx.timed_out || ctx.connect_failed || ctx.status.is_some() {
        None
    } else {
        transport
    };
    let is_timeout = ctx.timed_out || unlabeled.is_some_and(|m| TIMEOUT_PATTERN.is_match(m));
    let is_network =
        !is_timeout && (ctx.connect_failed || unlabeled.is_some_and(|m| NETWORK_PATTERN.is_match(m)));

    let message = if is_timeout {
        TIMEOUT_MESSAGE.to_string()
    } else if is_network {
        NETWORK_MESSAGE.to_string()
    } else if let Some(server) = ctx.body.as_ref().and_then(server_message) {
        server
    } else if let Some(transport) = transport {
        transport.to_string()
    } else {
        FALLBACK_MESSAGE.to_string()
    };

    let kind = if is_timeout {
        ErrorKind::Timeout
    } else if is_network {
        ErrorKind::NetworkUnreachable
    } else if status == 401 {
        ErrorKind::AuthenticationExpired
    } else if status >= 300 {
        ErrorKind::ServerRejected
    } else if transport.is_some() {
        ErrorKind::TransportFailure
    } else {
        ErrorKind::Unknown
    };

    HttpError {
        data: ctx.body,
        ..HttpError::new(kind, message, status)
    }
}

/// Extract the human-readable `message` from a JSON error body
///
/// Validation failures often carry an array of messages; those are joined.
pub fn server_message(body: &Value) -> Option<String> {
    match body.get("message")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

/// Render an error together with its sources, reqwest hides the interesting part in the chain
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, HttpError>;
