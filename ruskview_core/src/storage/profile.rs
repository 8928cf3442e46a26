use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// A user-named cluster connection preset.
///
/// The credential set is flattened next to the common fields and tagged by
/// `auth_type`, so the JSON looks like:
/// `{ "id":"…", "name":"local", "url":"http://localhost:9200",
///    "auth_type":"basic", "username":"admin", "password":"admin" }`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub auth: AuthConfig,
}

/// Exactly one credential set, selected by the variant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "auth_type", rename_all = "lowercase")]
pub enum AuthConfig {
    Basic {
        username: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        password: String,
    },
    Iam {
        region: String,
        access_key: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        secret_key: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthKind {
    Basic,
    Iam,
}

impl ConnectionProfile {
    /// New profile with a freshly minted id.
    pub fn new(name: impl Into<String>, url: impl Into<String>, auth: AuthConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            url: url.into(),
            auth,
        }
    }

    pub fn auth_kind(&self) -> AuthKind {
        self.auth.kind()
    }

    /// Shape checks the store enforces on write: non-empty name, absolute URL.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("profile name must not be empty".into());
        }
        parse_base_url(&self.url)?;
        Ok(())
    }

    /// `validate` plus the credential fields a connection attempt needs.
    pub fn validate_for_connect(&self) -> Result<(), String> {
        self.validate()?;
        match &self.auth {
            AuthConfig::Basic { username, .. } => {
                if username.is_empty() {
                    return Err("basic auth requires a username".into());
                }
            }
            AuthConfig::Iam {
                region,
                access_key,
                secret_key,
            } => {
                if region.is_empty() {
                    return Err("IAM auth requires a region".into());
                }
                if access_key.is_empty() || secret_key.is_empty() {
                    return Err("IAM auth requires an access key and a secret key".into());
                }
            }
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn iam(
        region: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        AuthConfig::Iam {
            region: region.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn kind(&self) -> AuthKind {
        match self {
            AuthConfig::Basic { .. } => AuthKind::Basic,
            AuthConfig::Iam { .. } => AuthKind::Iam,
        }
    }

    /// The secret half of the credential set, with the field name it persists under.
    pub fn secret(&self) -> (&'static str, &str) {
        match self {
            AuthConfig::Basic { password, .. } => ("password", password),
            AuthConfig::Iam { secret_key, .. } => ("secret_key", secret_key),
        }
    }

    pub(crate) fn set_secret(&mut self, value: String) {
        match self {
            AuthConfig::Basic { password, .. } => *password = value,
            AuthConfig::Iam { secret_key, .. } => *secret_key = value,
        }
    }
}

/// Read-side projection used by the connect screen's auth-type switch.
pub fn filter_by_auth(profiles: &[ConnectionProfile], kind: AuthKind) -> Vec<ConnectionProfile> {
    profiles
        .iter()
        .filter(|p| p.auth_kind() == kind)
        .cloned()
        .collect()
}

/// Parses a cluster base URL; only absolute http(s) URLs with a host pass.
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("'{}' is not a valid URL: {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("'{}' must use http or https", raw));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(format!("'{}' has no host", raw));
    }
    Ok(url)
}

// Debug output ends up in logs; keep secrets out of it.
impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &self.url)
            .field("auth", &self.auth)
            .finish()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            AuthConfig::Iam {
                region, access_key, ..
            } => f
                .debug_struct("Iam")
                .field("region", region)
                .field("access_key", access_key)
                .field("secret_key", &"<redacted>")
                .finish(),
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthKind::Basic => write!(f, "basic"),
            AuthKind::Iam => write!(f, "iam"),
        }
    }
}

impl FromStr for AuthKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(AuthKind::Basic),
            "iam" | "aws" => Ok(AuthKind::Iam),
            other => Err(format!("unknown auth type '{}', expected basic or iam", other)),
        }
    }
}
