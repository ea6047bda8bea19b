use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use url::Url;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::models::session::{CreateSessionRequest, Session, SessionListPayload};

pub const API_KEY_HEADER: &str = "X-API-Key";

#[async_trait]
pub trait SessionApi: Send + Sync {
    fn set_api_key(&self, key: Option<String>);

    fn has_api_key(&self) -> bool;

    async fn create_session(&self, request: &CreateSessionRequest) -> Result<Session, AppError>;

    async fn list_sessions(&self) -> Result<Vec<Session>, AppError>;

    async fn get_session(&self, id: &str) -> Result<Session, AppError>;

    async fn delete_session(&self, id: &str) -> Result<(), AppError>;
}

/// HTTP client for the session endpoints. Sends `X-API-Key` only while a key is set.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let mut raw = config.base_url.trim().trim_end_matches('/').to_string();
        raw.push('/');
        let base_url = Url::parse(&raw).map_err(|e| AppError::Message(format!("Invalid API url '{raw}': {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Message(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Message(format!("Invalid endpoint '{path}': {e}")))
    }

    fn session_endpoint(&self, id: &str) -> Result<Url, AppError> {
        let mut url = self.endpoint("sessions")?;
        url.path_segments_mut()
            .map_err(|_| AppError::Message("API url cannot be a base".to_string()))?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self
            .api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match key {
            Some(key) => req.header(API_KEY_HEADER, key),
            None => req,
        }
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|s| s.to_string())
        .unwrap_or_else(|| status.as_str().to_string())
}

fn ensure_success(resp: Response, operation: &str) -> Result<Response, AppError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = status_text(resp.status());
    tracing::warn!(operation, %status, "session api request failed");
    Err(AppError::Http {
        operation: operation.to_string(),
        status,
    })
}

#[async_trait]
impl SessionApi for ApiClient {
    fn set_api_key(&self, key: Option<String>) {
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) = key;
    }

    fn has_api_key(&self) -> bool {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    async fn create_session(&self, request: &CreateSessionRequest) -> Result<Session, AppError> {
        let resp = self
            .authorize(self.client.post(self.endpoint("sessions")?))
            .json(request)
            .send()
            .await?;
        let resp = ensure_success(resp, "create session")?;
        Ok(resp.json().await?)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, AppError> {
        let resp = self
            .authorize(self.client.get(self.endpoint("sessions")?))
            .send()
            .await?;
        let resp = ensure_success(resp, "fetch sessions")?;
        let payload: SessionListPayload = resp.json().await?;
        Ok(payload.into_sessions())
    }

    async fn get_session(&self, id: &str) -> Result<Session, AppError> {
        let resp = self
            .authorize(self.client.get(self.session_endpoint(id)?))
            .send()
            .await?;
        let resp = ensure_success(resp, "fetch session")?;
        Ok(resp.json().await?)
    }

    async fn delete_session(&self, id: &str) -> Result<(), AppError> {
        let resp = self
            .authorize(self.client.delete(self.session_endpoint(id)?))
            .send()
            .await?;
        ensure_success(resp, "delete session")?;
        Ok(())
    }
}
