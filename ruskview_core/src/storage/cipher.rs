//! At-rest encryption for secrets kept in `profiles.json`.
//!
//! Each profile directory has its own random AES-256-GCM key in
//! `profiles.key` (owner-only on Unix). Sealed values are stored as
//! `enc:v1:<base64(nonce || ciphertext)>`; anything without that prefix is
//! read as a legacy plaintext secret and sealed on the next save.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::prelude::*;
use log::info;
use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::StoreError;

pub(crate) const KEY_FILE: &str = "profiles.key";
const SEALED_PREFIX: &str = "enc:v1:";
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

pub(crate) struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// Reads the directory key, minting one if the directory has none yet.
    /// Callers hold the store's directory lock.
    pub(crate) fn load_or_create(dir: &Path) -> Result<Self, StoreError> {
        let path = dir.join(KEY_FILE);
        let key = match fs::read_to_string(&path) {
            Ok(encoded) => BASE64_STANDARD
                .decode(encoded.trim())
                .map_err(|e| StoreError::Cipher(format!("{:?} is not a valid key: {}", path, e)))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let mut key = vec![0u8; KEY_LEN];
                OsRng.fill_bytes(&mut key);
                write_key_file(&path, &BASE64_STANDARD.encode(&key))?;
                info!("Created profile secret key at {:?}", path);
                key
            }
            Err(e) => return Err(e.into()),
        };
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| StoreError::Cipher(format!("{:?} is not a valid key: {}", path, e)))?;
        Ok(Self { cipher })
    }

    pub(crate) fn seal(&self, plaintext: &str) -> Result<String, StoreError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| StoreError::Cipher(format!("Failed to encrypt secret: {}", e)))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(format!("{}{}", SEALED_PREFIX, BASE64_STANDARD.encode(out)))
    }

    pub(crate) fn open(&self, stored: &str) -> Result<String, StoreError> {
        let Some(encoded) = stored.strip_prefix(SEALED_PREFIX) else {
            return Ok(stored.to_string());
        };
        let data = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| StoreError::Cipher(format!("Sealed secret is not base64: {}", e)))?;
        if data.len() < NONCE_LEN {
            return Err(StoreError::Cipher("Sealed secret is truncated".into()));
        }
        let (nonce, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| StoreError::Cipher("Failed to decrypt secret (wrong key?)".into()))?;
        String::from_utf8(plaintext)
            .map_err(|e| StoreError::Cipher(format!("Decrypted secret is not UTF-8: {}", e)))
    }
}

fn write_key_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
