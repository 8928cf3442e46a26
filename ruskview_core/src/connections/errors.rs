use std::fmt::{self, Display};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Machine-readable category shared by every error the core returns.
///
/// `Display` on the concrete errors gives the human-readable message; this
/// tells a caller *what kind* of failure it is without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Storage,
    InvalidProfile,
    NetworkUnreachable,
    Timeout,
    AuthenticationFailed,
    SigningError,
    SessionBusy,
    Cancelled,
    UnexpectedStatus,
    NoActiveSession,
    InvalidRequest,
    InvalidRequestBody,
    Proxy,
    MalformedResponse,
}

/// Signing failed before the request left the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningError(pub String);

impl Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request signing failed: {}", self.0)
    }
}

impl std::error::Error for SigningError {}

/// Failure reported by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The host could not be reached (DNS, refused, TLS, reset).
    Unreachable(String),
    /// The caller-supplied deadline elapsed; the request was abandoned.
    Timeout(Duration),
    /// The request could not be turned into a wire request.
    Request(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Unreachable(msg) => write!(f, "Cluster unreachable: {}", msg),
            TransportError::Timeout(after) => {
                write!(f, "No response within {} ms", after.as_millis())
            }
            TransportError::Request(msg) => write!(f, "Could not build request: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors from `SessionManager::test` and `SessionManager::connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    InvalidProfile(String),
    NetworkUnreachable(String),
    Timeout(Duration),
    AuthenticationFailed { status: u16, body: String },
    Signing(SigningError),
    UnexpectedStatus { status: u16, body: String },
    SessionBusy,
    /// A `disconnect` overtook this connect attempt.
    Cancelled,
}

impl ConnectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectionError::InvalidProfile(_) => ErrorKind::InvalidProfile,
            ConnectionError::NetworkUnreachable(_) => ErrorKind::NetworkUnreachable,
            ConnectionError::Timeout(_) => ErrorKind::Timeout,
            ConnectionError::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
            ConnectionError::Signing(_) => ErrorKind::SigningError,
            ConnectionError::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
            ConnectionError::SessionBusy => ErrorKind::SessionBusy,
            ConnectionError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<SigningError> for ConnectionError {
    fn from(err: SigningError) -> Self {
        ConnectionError::Signing(err)
    }
}

impl From<TransportError> for ConnectionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(after) => ConnectionError::Timeout(after),
            TransportError::Unreachable(msg) => ConnectionError::NetworkUnreachable(msg),
            TransportError::Request(msg) => ConnectionError::InvalidProfile(msg),
        }
    }
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::InvalidProfile(msg) => write!(f, "Invalid profile: {}", msg),
            ConnectionError::NetworkUnreachable(msg) => write!(f, "Cluster unreachable: {}", msg),
            ConnectionError::Timeout(after) => write!(
                f,
                "Cluster did not answer within {} ms",
                after.as_millis()
            ),
            ConnectionError::AuthenticationFailed { status, .. } => write!(
                f,
                "Cluster rejected the credentials (HTTP {})",
                status
            ),
            ConnectionError::Signing(e) => write!(f, "{}", e),
            ConnectionError::UnexpectedStatus { status, body } => {
                write!(f, "Cluster answered HTTP {}: {}", status, preview(body))
            }
            ConnectionError::SessionBusy => {
                write!(f, "Another connection attempt is already in progress")
            }
            ConnectionError::Cancelled => {
                write!(f, "Connection attempt was cancelled by a disconnect")
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Errors from `RequestProxy::send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    NoActiveSession,
    /// Path or method the proxy refuses to forward.
    InvalidRequest(String),
    InvalidRequestBody(String),
    Signing(SigningError),
    NetworkUnreachable(String),
    Timeout(Duration),
    /// Non-2xx answer; `body` is the raw payload exactly as the cluster sent it.
    Status { status: u16, body: String },
    MalformedResponse(String),
}

impl ProxyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxyError::NoActiveSession => ErrorKind::NoActiveSession,
            ProxyError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ProxyError::InvalidRequestBody(_) => ErrorKind::InvalidRequestBody,
            ProxyError::Signing(_) => ErrorKind::SigningError,
            ProxyError::NetworkUnreachable(_) => ErrorKind::NetworkUnreachable,
            ProxyError::Timeout(_) => ErrorKind::Timeout,
            ProxyError::Status { .. } => ErrorKind::Proxy,
            ProxyError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    /// The HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProxyError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The cluster's error payload parsed as JSON, when it is JSON.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        match self {
            ProxyError::Status { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

impl From<SigningError> for ProxyError {
    fn from(err: SigningError) -> Self {
        ProxyError::Signing(err)
    }
}

impl From<TransportError> for ProxyError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(after) => ProxyError::Timeout(after),
            TransportError::Unreachable(msg) => ProxyError::NetworkUnreachable(msg),
            TransportError::Request(msg) => ProxyError::InvalidRequest(msg),
        }
    }
}

impl Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::NoActiveSession => write!(f, "No active connection"),
            ProxyError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ProxyError::InvalidRequestBody(msg) => write!(f, "Invalid request body: {}", msg),
            ProxyError::Signing(e) => write!(f, "{}", e),
            ProxyError::NetworkUnreachable(msg) => write!(f, "Cluster unreachable: {}", msg),
            ProxyError::Timeout(after) => write!(
                f,
                "Cluster did not answer within {} ms",
                after.as_millis()
            ),
            ProxyError::Status { status, body } => {
                write!(f, "Cluster returned HTTP {}: {}", status, preview(body))
            }
            ProxyError::MalformedResponse(msg) => {
                write!(f, "Cluster response is not valid JSON: {}", msg)
            }
        }
    }
}

impl std::error::Error for ProxyError {}

const PREVIEW_LEN: usize = 500;

/// Shortens a response body for log lines and messages.
pub(crate) fn preview(body: &str) -> String {
    if body.len() <= PREVIEW_LEN {
        return body.to_string();
    }
    let mut end = PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
