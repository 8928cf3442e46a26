use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use log::{debug, warn};
use serde_json::Value;
use tempfile::NamedTempFile;

use super::cipher::SecretCipher;
use super::errors::StoreError;
use super::profile::ConnectionProfile;
use super::vault::SecretVault;

const PROFILES_FILE: &str = "profiles.json";
const LOCK_FILE: &str = "profiles.lock";

/// Durable, ordered catalog of connection profiles.
///
/// All profiles live in one JSON array so `list` keeps insertion order.
/// Every load-modify-write cycle holds an exclusive lock on `profiles.lock`,
/// which serializes writers across store instances and processes. The new
/// file is written to a uniquely named temp file and renamed into place, so
/// readers never see half a file.
///
/// Secrets are sealed with the directory key unless a vault holds them.
#[derive(Clone)]
pub struct ProfileStore {
    dir: PathBuf,
    file: PathBuf,
    cipher: Arc<SecretCipher>,
    vault: Option<Arc<dyn SecretVault>>,
}

impl ProfileStore {
    /// `~/.config/ruskview/profiles.json` on Linux, `%APPDATA%\ruskview\…` on Windows, etc.
    pub fn new() -> Result<Self, StoreError> {
        let proj = ProjectDirs::from("", "", "ruskview")
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "Unable to locate config dir"))?;
        Self::at(proj.config_dir())
    }

    /// Store rooted at an explicit directory (created if missing).
    pub fn at(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let cipher = {
            let _lock = DirLock::acquire(&dir)?;
            SecretCipher::load_or_create(&dir)?
        };
        Ok(Self {
            file: dir.join(PROFILES_FILE),
            dir,
            cipher: Arc::new(cipher),
            vault: None,
        })
    }

    /// Keep secrets in `vault` instead of the JSON file.
    pub fn with_vault(mut self, vault: Arc<dyn SecretVault>) -> Self {
        self.vault = Some(vault);
        self
    }

    pub fn path(&self) -> &PathBuf {
        &self.file
    }

    /// Returns every stored profile in insertion order (skips malformed records).
    pub fn list(&self) -> Result<Vec<ConnectionProfile>, StoreError> {
        let mut out = Vec::new();
        for record in self.load_records()? {
            match serde_json::from_value::<ConnectionProfile>(record) {
                Ok(profile) => out.push(self.hydrate(profile)?),
                Err(e) => warn!("Skipping unreadable profile in {:?}: {e}", self.file),
            }
        }
        Ok(out)
    }

    /// `Ok(None)` when no profile carries `id`.
    pub fn find_by_id(&self, id: &str) -> Result<Option<ConnectionProfile>, StoreError> {
        Ok(self.list()?.into_iter().find(|p| p.id == id))
    }

    /// Insert a new profile or overwrite the one with the same id in place.
    pub fn save(&self, profile: &ConnectionProfile) -> Result<ConnectionProfile, StoreError> {
        profile.validate().map_err(StoreError::Validation)?;

        let _lock = DirLock::acquire(&self.dir)?;

        let mut on_disk = profile.clone();
        let (field, secret) = profile.auth.secret();
        match &self.vault {
            Some(vault) => {
                vault.store(&profile.id, field, secret)?;
                on_disk.auth.set_secret(String::new());
            }
            None => on_disk.auth.set_secret(self.cipher.seal(secret)?),
        }
        let record = serde_json::to_value(&on_disk)?;

        let mut records = self.load_records()?;
        match records.iter().position(|r| record_id(r) == Some(profile.id.as_str())) {
            Some(idx) => {
                // An overwrite may switch auth kind; drop the old kind's secret.
                if let (Some(vault), Ok(old)) = (
                    &self.vault,
                    serde_json::from_value::<ConnectionProfile>(records[idx].clone()),
                ) {
                    if old.auth_kind() != profile.auth_kind() {
                        vault.remove(&old.id, old.auth.secret().0)?;
                    }
                }
                records[idx] = record;
                debug!("Updated profile '{}' ({})", profile.name, profile.id);
            }
            None => {
                records.push(record);
                debug!("Added profile '{}' ({})", profile.name, profile.id);
            }
        }
        self.write_records(&records)?;
        Ok(profile.clone())
    }

    /// Delete a profile (`Ok(true)` if removed, `Ok(false)` if it didn't exist).
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _lock = DirLock::acquire(&self.dir)?;

        let mut records = self.load_records()?;
        let Some(idx) = records.iter().position(|r| record_id(r) == Some(id)) else {
            return Ok(false);
        };
        let removed = records.remove(idx);
        self.write_records(&records)?;

        if let (Some(vault), Ok(old)) = (
            &self.vault,
            serde_json::from_value::<ConnectionProfile>(removed),
        ) {
            vault.remove(&old.id, old.auth.secret().0)?;
        }
        debug!("Deleted profile {id}");
        Ok(true)
    }

    fn hydrate(&self, mut profile: ConnectionProfile) -> Result<ConnectionProfile, StoreError> {
        let (field, stored) = profile.auth.secret();
        if !stored.is_empty() {
            match self.cipher.open(stored) {
                Ok(secret) => profile.auth.set_secret(secret),
                Err(e) => {
                    warn!("Secret of profile '{}' is unreadable: {e}", profile.name);
                    profile.auth.set_secret(String::new());
                }
            }
            return Ok(profile);
        }
        if let Some(vault) = &self.vault {
            if let Some(secret) = vault.load(&profile.id, field)? {
                profile.auth.set_secret(secret);
            }
        }
        Ok(profile)
    }

    fn load_records(&self) -> Result<Vec<Value>, StoreError> {
        match fs::read(&self.file) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_records(&self, records: &[Value]) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, records)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.file).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Exclusive advisory lock on `profiles.lock`, released on drop.
struct DirLock(File);

impl DirLock {
    fn acquire(dir: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE))?;
        file.lock()?;
        Ok(Self(file))
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = self.0.unlock();
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

impl fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileStore")
            .field("file", &self.file)
            .field("vault", &self.vault.is_some())
            .finish()
    }
}
