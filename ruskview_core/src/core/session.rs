use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connections::credentials::CredentialStrategy;
use crate::connections::errors::ErrorKind;
use crate::storage::profile::ConnectionProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed { kind: ErrorKind, reason: String },
}

/// What the probe learned about the cluster, when it said anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl ClusterInfo {
    /// Reads `cluster_name` and `version.number`, as served by `/` and `/_cluster/health`.
    pub fn from_probe(body: &Value) -> Option<Self> {
        let name = body
            .get("cluster_name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let version = body
            .pointer("/version/number")
            .and_then(Value::as_str)
            .map(str::to_string);
        if name.is_none() && version.is_none() {
            return None;
        }
        Some(Self { name, version })
    }
}

/// Read-only snapshot of the process-wide session.
///
/// The profile is a copy taken at connect time; editing the stored profile
/// afterwards does not affect the live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub profile: Option<ConnectionProfile>,
    pub status: SessionStatus,
    pub cluster: Option<ClusterInfo>,
}

impl Session {
    pub fn disconnected() -> Self {
        Self {
            profile: None,
            status: SessionStatus::Disconnected,
            cluster: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// The bound profile plus the strategy derived from it, captured together
/// so an in-flight request never mixes credentials.
pub(crate) struct ActiveSession {
    pub profile: ConnectionProfile,
    pub strategy: CredentialStrategy,
    pub cluster: Option<ClusterInfo>,
}

impl fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSession")
            .field("profile", &self.profile.id)
            .field("strategy", &self.strategy)
            .finish()
    }
}
