use std::fmt::{self, Display};

use crate::connections::errors::ErrorKind;

/// Errors from the profile store and its secret vault.
#[derive(Debug)]
pub enum StoreError {
    /// Bad profile shape; nothing was written.
    Validation(String),
    IoError(std::io::Error),
    Serde(serde_json::Error),
    Vault(String),
    /// A sealed secret could not be encrypted or opened.
    Cipher(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Storage,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> StoreError {
        StoreError::IoError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> StoreError {
        StoreError::Serde(err)
    }
}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        StoreError::Vault(err.to_string())
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(msg) => write!(f, "Invalid profile: {}", msg),
            StoreError::IoError(e) => write!(f, "Profile storage error: {}", e),
            StoreError::Serde(e) => write!(f, "Profile file is corrupt: {}", e),
            StoreError::Vault(msg) => write!(f, "Keyring error: {}", msg),
            StoreError::Cipher(msg) => write!(f, "Profile secret error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
