use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::connections::credentials::DEFAULT_IAM_SERVICE;

/// Where profile secrets are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretStorage {
    /// In the profile file, sealed with the directory's `profiles.key`.
    #[default]
    Inline,
    /// In the OS keyring; the profile file carries no secret.
    Keyring,
}

/// Runtime knobs for the core. Defaults suit a local cluster.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bound for probes and proxied requests when the caller has no opinion.
    pub request_timeout: Duration,
    /// Path probed by `test` and `connect`.
    pub probe_path: String,
    /// SigV4 service name (`es`, or `aoss` for serverless collections).
    pub iam_service: String,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
    /// Profile directory; `None` means the platform config dir.
    pub profile_dir: Option<PathBuf>,
    pub secret_storage: SecretStorage,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            probe_path: "/".into(),
            iam_service: DEFAULT_IAM_SERVICE.into(),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: format!("ruskview/{}", env!("CARGO_PKG_VERSION")),
            profile_dir: None,
            secret_storage: SecretStorage::Inline,
        }
    }
}

impl Settings {
    /// Defaults overridden by `RUSKVIEW_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(secs) = lookup("RUSKVIEW_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&secs| secs > 0)
        {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("RUSKVIEW_PROBE_PATH").filter(|p| p.starts_with('/')) {
            settings.probe_path = path;
        }
        if let Some(service) = lookup("RUSKVIEW_IAM_SERVICE").filter(|s| !s.is_empty()) {
            settings.iam_service = service;
        }
        if let Some(dir) = lookup("RUSKVIEW_PROFILE_DIR").filter(|d| !d.is_empty()) {
            settings.profile_dir = Some(PathBuf::from(dir));
        }
        if let Some(mode) = lookup("RUSKVIEW_SECRETS") {
            settings.secret_storage = match mode.to_ascii_lowercase().as_str() {
                "keyring" => SecretStorage::Keyring,
                _ => SecretStorage::Inline,
            };
        }
        settings
    }
}
