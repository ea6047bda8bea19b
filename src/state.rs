use std::sync::Arc;

use crate::activity::adapters::AdapterRegistry;
use crate::activity::throttle::ActivityHandle;
use crate::auth::credentials::CredentialStore;
use crate::client::api::{ApiClient, SessionApi};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::store::sqlite::SqliteStore;

const APP_NAME: &str = "research-sidebar";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: Arc<CredentialStore>,
    pub api: Arc<dyn SessionApi>,
    pub activity: ActivityHandle,
}

impl AppState {
    pub fn init(config: AppConfig) -> Result<Self, AppError> {
        let store = match &config.store_path {
            Some(path) => SqliteStore::open_at(path)?,
            None => SqliteStore::new(APP_NAME)?,
        };
        let credentials = CredentialStore::persisted(store)?;
        let api = ApiClient::new(&config.api)?;
        Ok(Self::from_parts(config, credentials, Arc::new(api)))
    }

    /// Wires already-built parts together and installs any stored key on the client.
    pub fn from_parts(config: AppConfig, credentials: CredentialStore, api: Arc<dyn SessionApi>) -> Self {
        api.set_api_key(credentials.api_key());
        let activity = ActivityHandle::new(config.activity.clone(), Arc::new(AdapterRegistry::builtin()));
        Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            api,
            activity,
        }
    }
}
