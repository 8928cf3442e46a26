use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use http::Method;
use log::{debug, info, warn};
use serde_json::Value;

use crate::config::Settings;
use crate::connections::credentials::CredentialStrategy;
use crate::connections::errors::ConnectionError;
use crate::connections::transport::{build_request, dispatch, Transport};
use crate::core::session::{ActiveSession, ClusterInfo, Session, SessionStatus};
use crate::storage::profile::ConnectionProfile;

struct SessionState {
    status: SessionStatus,
    active: Option<Arc<ActiveSession>>,
    /// Bumped by every `connect` start and every `disconnect`; a connect
    /// only commits if the counter still holds the value it started with.
    attempt: u64,
}

/// Owns the single active cluster session.
///
/// The state lives behind an `Arc<Mutex<…>>`, so cloning the manager is cheap
/// and every clone sees the same session. The lock is never held across a
/// network call: status and profile change together in one critical section,
/// and the probe itself runs unlocked.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Mutex<SessionState>>,
    transport: Arc<dyn Transport>,
    probe_path: String,
    iam_service: String,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>, settings: &Settings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                status: SessionStatus::Disconnected,
                active: None,
                attempt: 0,
            })),
            transport,
            probe_path: settings.probe_path.clone(),
            iam_service: settings.iam_service.clone(),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        let state = self.state();
        Session {
            profile: state.active.as_ref().map(|a| a.profile.clone()),
            status: state.status.clone(),
            cluster: state.active.as_ref().and_then(|a| a.cluster.clone()),
        }
    }

    /// Probe `profile` with its credentials without touching the session.
    pub async fn test(
        &self,
        profile: &ConnectionProfile,
        timeout: Duration,
    ) -> Result<(), ConnectionError> {
        profile
            .validate_for_connect()
            .map_err(ConnectionError::InvalidProfile)?;
        info!("Testing connection to '{}' at {}", profile.name, profile.url);
        self.probe(profile, timeout).await.map(|_| ())
    }

    /// Probe `profile` and, on success, make it the active session.
    ///
    /// A second call while one is `Connecting` gets `SessionBusy`.
    pub async fn connect(
        &self,
        profile: ConnectionProfile,
        timeout: Duration,
    ) -> Result<(), ConnectionError> {
        profile
            .validate_for_connect()
            .map_err(ConnectionError::InvalidProfile)?;

        let attempt = {
            let mut state = self.state();
            if state.status == SessionStatus::Connecting {
                debug!("Rejecting connect to '{}': attempt in flight", profile.name);
                return Err(ConnectionError::SessionBusy);
            }
            state.attempt += 1;
            state.status = SessionStatus::Connecting;
            state.active = None;
            state.attempt
        };
        info!("Connecting to '{}' at {}", profile.name, profile.url);

        let mut guard = AttemptGuard {
            manager: self,
            attempt,
            armed: true,
        };
        let outcome = self.probe(&profile, timeout).await;
        guard.armed = false;

        let mut state = self.state();
        if state.attempt != attempt {
            info!("Discarding connect to '{}': superseded by disconnect", profile.name);
            return Err(ConnectionError::Cancelled);
        }
        match outcome {
            Ok(cluster) => {
                let strategy = CredentialStrategy::for_profile(&profile, &self.iam_service);
                info!("Connected to '{}' ({:?})", profile.name, cluster);
                state.status = SessionStatus::Connected;
                state.active = Some(Arc::new(ActiveSession {
                    profile,
                    strategy,
                    cluster,
                }));
                Ok(())
            }
            Err(e) => {
                warn!("Connection to '{}' failed: {}", profile.name, e);
                state.status = SessionStatus::Failed {
                    kind: e.kind(),
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Drop the active session. Safe to call in any state.
    pub fn disconnect(&self) {
        let mut state = self.state();
        state.attempt += 1;
        if let Some(active) = state.active.take() {
            info!("Disconnected from '{}'", active.profile.name);
        }
        state.status = SessionStatus::Disconnected;
    }

    /// The bound profile and strategy, only while `Connected`.
    pub(crate) fn active(&self) -> Option<Arc<ActiveSession>> {
        let state = self.state();
        match state.status {
            SessionStatus::Connected => state.active.clone(),
            _ => None,
        }
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    async fn probe(
        &self,
        profile: &ConnectionProfile,
        timeout: Duration,
    ) -> Result<Option<ClusterInfo>, ConnectionError> {
        let strategy = CredentialStrategy::for_profile(profile, &self.iam_service);
        let request = build_request(&profile.url, Method::GET, &self.probe_path, None)
            .map_err(|reason| match strategy.canonicalization_error(&reason) {
                Some(signing) => ConnectionError::Signing(signing),
                None => ConnectionError::InvalidProfile(reason),
            })?;
        let request = strategy.authenticate(request)?;

        let response = dispatch(self.transport.as_ref(), request, timeout).await?;
        let status = response.status.as_u16();
        if response.status.is_success() {
            let cluster = serde_json::from_slice::<Value>(&response.body)
                .ok()
                .and_then(|body| ClusterInfo::from_probe(&body));
            return Ok(cluster);
        }
        match status {
            401 | 403 => Err(ConnectionError::AuthenticationFailed {
                status,
                body: response.text(),
            }),
            _ => Err(ConnectionError::UnexpectedStatus {
                status,
                body: response.text(),
            }),
        }
    }
}

/// Resets a `Connecting` session if the connect future is dropped mid-probe.
struct AttemptGuard<'a> {
    manager: &'a SessionManager,
    attempt: u64,
    armed: bool,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.manager.state();
        if state.attempt == self.attempt && state.status == SessionStatus::Connecting {
            warn!("Connect attempt abandoned before completion");
            state.status = SessionStatus::Disconnected;
        }
    }
}
