//! File-backed user store
//!
//! Users are supplied from outside the binary as a YAML document:
//!
//! ```yaml
//! users:
//!   - email: grower@nursery.example
//!     password_sha256: 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
//! ```
//!
//! Only SHA-256 digests of the secrets are kept in memory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

use crate::core::auth::CredentialVerifier;
use crate::core::error::ConfigError;

/// One user entry in the store file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    /// Hex-encoded SHA-256 of the password
    pub password_sha256: String,
}

#[derive(Debug, Deserialize)]
struct UserFile {
    #[serde(default)]
    users: Vec<UserRecord>,
}

/// Hex-encoded SHA-256 digest of `secret`
pub fn digest_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Closed set of users loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    digests: HashMap<String, [u8; 32]>,
}

impl StaticCredentialStore {
    pub fn new(records: Vec<UserRecord>) -> Result<Self, ConfigError> {
        let mut digests = HashMap::with_capacity(records.len());
        for record in records {
            let digest = decode_digest(&record.password_sha256).ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: "password_sha256".to_string(),
                    value: record.email.clone(),
                    message: "expected 64 hex characters".to_string(),
                }
            })?;
            digests.insert(record.email, digest);
        }
        Ok(Self { digests })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: UserFile = serde_yaml::from_str(yaml)?;
        Self::new(file.users)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let file: UserFile = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        Self::new(file.users)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

fn decode_digest(value: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(value.trim()).ok()?;
    bytes.try_into().ok()
}

#[async_trait]
impl CredentialVerifier for StaticCredentialStore {
    async fn verify(&self, identifier: &str, secret: &str) -> bool {
        match self.digests.get(identifier) {
            Some(expected) => Sha256::digest(secret.as_bytes()).as_slice() == expected.as_slice(),
            None => false,
        }
    }
}
