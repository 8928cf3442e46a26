use std::time::Duration;

use async_trait::async_trait;
use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{Method, StatusCode};
use log::debug;
use reqwest::Client;

use super::errors::TransportError;
use crate::config::Settings;

/// The request type both credential strategies sign.
pub type OutboundRequest = http::Request<Vec<u8>>;

/// What came back from the cluster, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.into(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A trait representing the wire: hand it a signed request, get a response.
///
/// `HttpTransport` is the real one; tests swap in a recording fake.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport sharing one connection pool across sessions.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self, TransportError> {
        let client = Client::builder()
            .pool_idle_timeout(settings.pool_idle_timeout)
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let request = reqwest::Request::try_from(request)
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let response = self.client.execute(request).await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Request(err.to_string())
    } else {
        TransportError::Unreachable(err.to_string())
    }
}

/// Run `request` on `transport`, abandoning it once `timeout` elapses.
///
/// Dropping the in-flight future cancels the underlying HTTP call.
pub async fn dispatch(
    transport: &dyn Transport,
    request: OutboundRequest,
    timeout: Duration,
) -> Result<TransportResponse, TransportError> {
    debug!("{} {}", request.method(), request.uri());
    match tokio::time::timeout(timeout, transport.execute(request)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(timeout)),
    }
}

/// Join a profile base URL and a server-relative path into a request.
pub fn build_request(
    base_url: &str,
    method: Method,
    path: &str,
    body: Option<Vec<u8>>,
) -> Result<OutboundRequest, String> {
    if !path.starts_with('/') {
        return Err(format!("path '{}' must start with '/'", path));
    }
    let url = format!("{}{}", base_url.trim().trim_end_matches('/'), path);

    let mut builder = http::Request::builder()
        .method(method)
        .uri(&url)
        .header(ACCEPT, HeaderValue::from_static("application/json"));
    if body.is_some() {
        builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    builder
        .body(body.unwrap_or_default())
        .map_err(|e| format!("'{}' is not a valid request URI: {}", url, e))
}
