pub mod config;
pub mod connections;
pub mod core;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use crate::config::{SecretStorage, Settings};
pub use crate::connections::errors::{ConnectionError, ErrorKind, ProxyError};
pub use crate::core::application::Application;
pub use crate::core::notifications::{LogNotifier, Notice, NoticeKind, Notifier};
pub use crate::core::operations::{ClusterOp, IndexOp, Params};
pub use crate::core::proxy::{ProxyRequest, RequestBody, RequestProxy};
pub use crate::core::session::{ClusterInfo, Session, SessionStatus};
pub use crate::core::session_manager::SessionManager;
pub use crate::storage::{AuthConfig, AuthKind, ConnectionProfile, ProfileStore, StoreError};
