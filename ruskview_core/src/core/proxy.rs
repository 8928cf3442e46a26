use std::time::Duration;

use http::Method;
use log::{debug, info};
use serde_json::Value;

use crate::connections::errors::{preview, ProxyError};
use crate::connections::transport::{build_request, dispatch};
use crate::core::session_manager::SessionManager;

/// Request body as the caller supplied it.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Text typed by the user; must parse as JSON before anything is sent.
    Raw(String),
}

/// One pass-through request: method, server-relative path, optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<RequestBody>,
}

impl ProxyRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    /// Parse a method name the way a text field would supply it.
    pub fn parse_method(raw: &str) -> Result<Method, ProxyError> {
        Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| ProxyError::InvalidRequest(format!("'{}' is not an HTTP method", raw)))
    }

    /// Body bytes to send, or why the request is refused before any network call.
    fn encode_body(&self) -> Result<Option<Vec<u8>>, ProxyError> {
        let Some(body) = &self.body else {
            return Ok(None);
        };
        if matches!(self.method, Method::GET | Method::DELETE | Method::HEAD) {
            return Err(ProxyError::InvalidRequestBody(format!(
                "{} requests must not carry a body",
                self.method
            )));
        }
        match body {
            RequestBody::Json(value) => serde_json::to_vec(value)
                .map(Some)
                .map_err(|e| ProxyError::InvalidRequestBody(e.to_string())),
            RequestBody::Raw(text) => {
                serde_json::from_str::<Value>(text)
                    .map_err(|e| ProxyError::InvalidRequestBody(e.to_string()))?;
                Ok(Some(text.clone().into_bytes()))
            }
        }
    }
}

/// Forwards arbitrary requests to whatever cluster is currently connected.
///
/// The proxy is a transparent pass-through: cluster errors come back
/// verbatim as `ProxyError::Status`, nothing is cached or retried, and a
/// failed request never changes the session.
#[derive(Clone)]
pub struct RequestProxy {
    sessions: SessionManager,
}

impl RequestProxy {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    pub async fn send(&self, request: ProxyRequest, timeout: Duration) -> Result<Value, ProxyError> {
        // Captured once; a concurrent disconnect cannot swap credentials under us.
        let active = self.sessions.active().ok_or(ProxyError::NoActiveSession)?;

        let body = request.encode_body()?;
        if !request.path.starts_with('/') {
            return Err(ProxyError::InvalidRequest(format!(
                "path '{}' must start with '/'",
                request.path
            )));
        }
        let outbound = build_request(&active.profile.url, request.method.clone(), &request.path, body)
            .map_err(|reason| match active.strategy.canonicalization_error(&reason) {
                Some(signing) => ProxyError::Signing(signing),
                None => ProxyError::InvalidRequest(reason),
            })?;
        let signed = active.strategy.authenticate(outbound)?;

        info!("Proxying {} {} to '{}'", request.method, request.path, active.profile.name);
        let response = dispatch(self.sessions.transport(), signed, timeout).await?;
        let text = response.text();
        debug!("Response {}: {}", response.status, preview(&text));

        if !response.status.is_success() {
            return Err(ProxyError::Status {
                status: response.status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ProxyError::MalformedResponse(format!("{}. Body: {}", e, preview(&text))))
    }
}
