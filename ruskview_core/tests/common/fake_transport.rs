//! A deterministic **in‑process stand‑in** for the HTTP transport.
//!
//! *  **From the test’s perspective**
//!    * Script answers with `respond` (default) or `push_response` (one-shot, FIFO).
//!    * Inspect everything the core tried to send via `calls()` / `call_count()`.
//!    * `gated()` fakes hold every request until the test calls `release`.
//!
//! *  **Why this exists**: It lets integration tests exercise the real session
//!    and proxy machinery (locks, timeouts, signing) without a cluster.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use ruskview_core::connections::errors::TransportError;
use ruskview_core::connections::transport::{OutboundRequest, Transport, TransportResponse};
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RecordedCall {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

type Scripted = Result<TransportResponse, TransportError>;

pub struct FakeTransport {
    default: Mutex<Scripted>,
    queue: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Mutex<Duration>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeTransport {
    /// Answers `200 {}` to everything until told otherwise.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// Like `new`, but each request waits for a `release` permit.
    pub fn gated() -> Arc<Self> {
        Arc::new(Self::build(Some(Arc::new(Semaphore::new(0)))))
    }

    fn build(gate: Option<Arc<Semaphore>>) -> Self {
        Self {
            default: Mutex::new(Ok(TransportResponse::new(200, "{}"))),
            queue: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: Mutex::new(Duration::ZERO),
            gate,
        }
    }

    pub fn respond(&self, status: u16, body: &str) {
        *self.default.lock().unwrap() = Ok(TransportResponse::new(status, body));
    }

    pub fn push_response(&self, status: u16, body: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse::new(status, body)));
    }

    pub fn fail_with(&self, error: TransportError) {
        *self.default.lock().unwrap() = Err(error);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Let `n` gated requests through.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request reached the transport")
    }

    /// Poll until `n` requests have arrived (they may still be gated).
    pub async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.call_count() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for requests to reach the fake transport");
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method().to_string(),
            uri: request.uri().to_string(),
            headers: request.headers().clone(),
            body: request.body().clone(),
        });

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let queued = self.queue.lock().unwrap().pop_front();
        match queued {
            Some(scripted) => scripted,
            None => self.default.lock().unwrap().clone(),
        }
    }
}
