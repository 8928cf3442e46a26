use std::sync::Arc;
use std::time::Duration;

use log::info;
use serde_json::Value;

use crate::config::{SecretStorage, Settings};
use crate::connections::errors::{ConnectionError, ProxyError};
use crate::connections::transport::{HttpTransport, Transport};
use crate::core::notifications::{LogNotifier, Notice, Notifier};
use crate::core::operations::{ClusterOp, IndexOp, Params};
use crate::core::proxy::{ProxyRequest, RequestBody, RequestProxy};
use crate::core::session::Session;
use crate::core::session_manager::SessionManager;
use crate::storage::errors::StoreError;
use crate::storage::profile::{filter_by_auth, AuthKind, ConnectionProfile};
use crate::storage::store::ProfileStore;
use crate::storage::vault::KeyringVault;

/// Everything a front end needs, wired together.
///
/// This is the boundary the connect screen, the dashboard, and the CLI call
/// into. Connection and profile outcomes are also pushed to the notifier;
/// proxied results are left for the caller to render.
#[derive(Clone)]
pub struct Application {
    store: ProfileStore,
    sessions: SessionManager,
    proxy: RequestProxy,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl Application {
    /// Real transport, on-disk store per `settings`, notices to the log.
    pub fn new(settings: &Settings) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::with_notifier(settings, Arc::new(LogNotifier))
    }

    pub fn with_notifier(
        settings: &Settings,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let store = match &settings.profile_dir {
            Some(dir) => ProfileStore::at(dir)?,
            None => ProfileStore::new()?,
        };
        let store = match settings.secret_storage {
            SecretStorage::Keyring => store.with_vault(Arc::new(KeyringVault::default())),
            SecretStorage::Inline => store,
        };
        let transport = Arc::new(HttpTransport::new(settings)?);
        Ok(Self::with_parts(store, transport, notifier, settings))
    }

    pub fn with_parts(
        store: ProfileStore,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        settings: &Settings,
    ) -> Self {
        let sessions = SessionManager::new(transport, settings);
        Self {
            store,
            proxy: RequestProxy::new(sessions.clone()),
            sessions,
            notifier,
            timeout: settings.request_timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn list_profiles(&self) -> Result<Vec<ConnectionProfile>, StoreError> {
        self.store.list()
    }

    pub fn profiles_by_auth(&self, kind: AuthKind) -> Result<Vec<ConnectionProfile>, StoreError> {
        Ok(filter_by_auth(&self.store.list()?, kind))
    }

    pub fn find_profile(&self, id: &str) -> Result<Option<ConnectionProfile>, StoreError> {
        self.store.find_by_id(id)
    }

    pub fn save_profile(&self, profile: &ConnectionProfile) -> Result<ConnectionProfile, StoreError> {
        match self.store.save(profile) {
            Ok(saved) => {
                self.notifier
                    .notify(Notice::success("Profile saved").with_message(saved.name.clone()));
                Ok(saved)
            }
            Err(e) => {
                self.notifier
                    .notify(Notice::error("Could not save profile").with_message(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn delete_profile(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.store.delete(id)?;
        if removed {
            self.notifier.notify(Notice::info("Profile deleted"));
        } else {
            self.notifier
                .notify(Notice::warning("Profile not found").with_message(id.to_string()));
        }
        Ok(removed)
    }

    pub async fn test_connection(&self, profile: &ConnectionProfile) -> Result<(), ConnectionError> {
        let result = self.sessions.test(profile, self.timeout).await;
        self.notifier.notify(match &result {
            Ok(()) => Notice::success("Connection Successful")
                .with_message(format!("Successfully connected to {}", profile.url)),
            Err(e) => Notice::error("Connection Failed").with_message(e.to_string()),
        });
        result
    }

    pub async fn connect(&self, profile: ConnectionProfile) -> Result<(), ConnectionError> {
        let name = profile.name.clone();
        let result = self.sessions.connect(profile, self.timeout).await;
        self.notifier.notify(match &result {
            Ok(()) => Notice::success("Connected").with_message(name),
            Err(e @ ConnectionError::SessionBusy) => {
                Notice::warning("Connection in progress").with_message(e.to_string())
            }
            Err(e) => Notice::error("Connection Failed").with_message(e.to_string()),
        });
        result
    }

    pub fn disconnect(&self) {
        let was_connected = self.sessions.current().is_connected();
        self.sessions.disconnect();
        if was_connected {
            self.notifier.notify(Notice::info("Disconnected"));
        }
    }

    pub fn current(&self) -> Session {
        self.sessions.current()
    }

    /// Generic pass-through used by the query console and the index list.
    pub async fn proxy(
        &self,
        method: &str,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<Value, ProxyError> {
        let request = ProxyRequest {
            method: ProxyRequest::parse_method(method)?,
            path: path.to_string(),
            body,
        };
        self.send(request).await
    }

    pub async fn send(&self, request: ProxyRequest) -> Result<Value, ProxyError> {
        self.proxy.send(request, self.timeout).await
    }

    pub async fn cluster_op(&self, op: ClusterOp, params: &Params) -> Result<Value, ProxyError> {
        info!("Cluster operation: {}", op);
        self.send(op.request(params)).await
    }

    pub async fn index_op(
        &self,
        op: IndexOp,
        index: &str,
        params: &Params,
        body: Option<Value>,
    ) -> Result<Value, ProxyError> {
        info!("Index operation: {} on {}", op, index);
        self.send(op.request(index, params, body)).await
    }
}
