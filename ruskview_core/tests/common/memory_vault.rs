use std::collections::HashMap;
use std::sync::Mutex;

use ruskview_core::storage::{SecretVault, StoreError};

/// Keyring stand-in that keeps secrets in a map.
#[derive(Default)]
pub struct MemoryVault {
    pub secrets: Mutex<HashMap<String, String>>,
}

impl MemoryVault {
    pub fn get(&self, profile_id: &str, field: &str) -> Option<String> {
        self.secrets
            .lock()
            .unwrap()
            .get(&format!("{profile_id}:{field}"))
            .cloned()
    }
}

impl SecretVault for MemoryVault {
    fn store(&self, profile_id: &str, field: &str, secret: &str) -> Result<(), StoreError> {
        self.secrets
            .lock()
            .unwrap()
            .insert(format!("{profile_id}:{field}"), secret.to_string());
        Ok(())
    }

    fn load(&self, profile_id: &str, field: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(profile_id, field))
    }

    fn remove(&self, profile_id: &str, field: &str) -> Result<(), StoreError> {
        self.secrets
            .lock()
            .unwrap()
            .remove(&format!("{profile_id}:{field}"));
        Ok(())
    }
}
