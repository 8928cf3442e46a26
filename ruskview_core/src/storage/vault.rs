use keyring::Entry;

use super::errors::StoreError;

/// Out-of-file storage for profile secrets (`password`, `secret_key`).
pub trait SecretVault: Send + Sync {
    fn store(&self, profile_id: &str, field: &str, secret: &str) -> Result<(), StoreError>;
    /// `Ok(None)` when nothing is stored for this profile/field.
    fn load(&self, profile_id: &str, field: &str) -> Result<Option<String>, StoreError>;
    fn remove(&self, profile_id: &str, field: &str) -> Result<(), StoreError>;
}

/// OS keychain backed vault (Keychain, Credential Manager, Secret Service).
#[derive(Debug, Clone)]
pub struct KeyringVault {
    service: String,
}

impl KeyringVault {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, profile_id: &str, field: &str) -> Result<Entry, StoreError> {
        Ok(Entry::new(&self.service, &format!("{profile_id}:{field}"))?)
    }
}

impl Default for KeyringVault {
    fn default() -> Self {
        Self::new("ruskview")
    }
}

impl SecretVault for KeyringVault {
    fn store(&self, profile_id: &str, field: &str, secret: &str) -> Result<(), StoreError> {
        self.entry(profile_id, field)?.set_password(secret)?;
        Ok(())
    }

    fn load(&self, profile_id: &str, field: &str) -> Result<Option<String>, StoreError> {
        match self.entry(profile_id, field)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, profile_id: &str, field: &str) -> Result<(), StoreError> {
        match self.entry(profile_id, field)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
