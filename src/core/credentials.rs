//! Storage and lookup of the completion-service API key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CredentialError, FixplsError};

/// Environment variables that override the stored key, in priority order
pub const API_KEY_ENV_VARS: [&str; 2] = ["FIXPLS_API_KEY", "OPENAI_API_KEY"];

const APP_DIR: &str = "fixpls";
const API_KEY_FILE: &str = "openai-api-key.txt";

/// Persisted credential for the completion service
pub trait CredentialStore {
    /// Stored key, or None when nothing (or only whitespace) is stored
    fn load(&self) -> Result<Option<String>, CredentialError>;

    /// Persist a key, trimming surrounding whitespace
    fn store(&self, key: &str) -> Result<(), CredentialError>;

    /// Remove the stored key; returns whether one existed
    fn clear(&self) -> Result<bool, CredentialError>;
}

/// Plaintext key file in the per-user data directory
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<data_dir>/fixpls/openai-api-key.txt`
    pub fn default_location() -> Result<Self, CredentialError> {
        let data_dir = dirs::data_dir().ok_or(CredentialError::NoDataDir)?;
        Ok(Self::new(data_dir.join(APP_DIR).join(API_KEY_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let key = content.trim();
                Ok(if key.is_empty() { None } else { Some(key.to_string()) })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CredentialError::ReadError(self.path.clone(), e)),
        }
    }

    fn store(&self, key: &str) -> Result<(), CredentialError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialError::Empty);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CredentialError::WriteError(self.path.clone(), e))?;
        }
        fs::write(&self.path, key).map_err(|e| CredentialError::WriteError(self.path.clone(), e))
    }

    fn clear(&self) -> Result<bool, CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CredentialError::WriteError(self.path.clone(), e)),
        }
    }
}

/// Pick the API key: environment override first, then the store
pub fn resolve_api_key<F>(store: &dyn CredentialStore, env: F) -> Result<String, FixplsError>
where
    F: Fn(&str) -> Option<String>,
{
    for var in API_KEY_ENV_VARS {
        if let Some(value) = env(var) {
            let value = value.trim();
            if !value.is_empty() {
                debug!("Using API key from {}", var);
                return Ok(value.to_string());
            }
        }
    }

    store.load()?.ok_or(FixplsError::MissingCredential)
}
