use std::sync::{PoisonError, RwLock};

use crate::error::AppError;
use crate::store::sqlite::SqliteStore;

const API_KEY_NAME: &str = "api_key";

/// Holds at most one API key. `None` means unauthenticated.
pub struct CredentialStore {
    api_key: RwLock<Option<String>>,
    backing: Option<SqliteStore>,
}

impl CredentialStore {
    pub fn in_memory() -> Self {
        Self {
            api_key: RwLock::new(None),
            backing: None,
        }
    }

    /// Loads any previously stored key from `store`; later writes go through to it.
    pub fn persisted(store: SqliteStore) -> Result<Self, AppError> {
        let api_key = store.credential_get(API_KEY_NAME)?;
        Ok(Self {
            api_key: RwLock::new(api_key),
            backing: Some(store),
        })
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn set_api_key(&self, key: &str) -> Result<(), AppError> {
        if let Some(store) = &self.backing {
            store.credential_set(API_KEY_NAME, key)?;
        }
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) = Some(key.to_string());
        Ok(())
    }

    pub fn clear_api_key(&self) -> Result<(), AppError> {
        if let Some(store) = &self.backing {
            store.credential_delete(API_KEY_NAME)?;
        }
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
