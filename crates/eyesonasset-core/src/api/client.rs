//! API client for the EyesOnAsset REST backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests against the owner and asset endpoints.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::SessionStore;
use crate::config::Config;
use crate::models::{Asset, AssetDraft, Owner, OwnerDraft};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const OWNER_PATH: &str = "/integrations/owner";
const ASSET_PATH: &str = "/integrations/asset";

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Default page size, matching the backend's own default
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// `skip`/`limit` pagination for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// API client for the owner/asset backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Create a client for the configured backend
    pub fn new(config: &Config, session: Arc<dyn SessionStore>) -> anyhow::Result<Self> {
        Self::with_base_url(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
            session,
        )
    }

    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        session: Arc<dyn SessionStore>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the stored bearer token, read fresh for every request
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.read() {
            Some(record) => builder.bearer_auth(record.token()),
            None => builder,
        }
    }

    /// Map non-2xx responses to errors. A 401 also drops the stored session,
    /// since the backend has rejected the token outright.
    async fn check_response(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "Backend rejected token, clearing session");
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "Failed to clear rejected session");
            }
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .authorized(self.client.get(&url).query(query))
                .send()
                .await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited);
                }
                warn!(url = %url, retry = retries, backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                continue;
            }

            let response = self.check_response(response).await?;
            return response
                .json()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)));
        }
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%method, url = %url, "Sending request");
        let response = self
            .authorized(self.client.request(method, &url).json(body))
            .send()
            .await?;
        let response = self.check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(url = %url, "Sending DELETE");
        let response = self.authorized(self.client.delete(&url)).send().await?;
        self.check_response(response).await?;
        Ok(())
    }

    fn page_query(page: Page) -> [(&'static str, String); 2] {
        [("skip", page.skip.to_string()), ("limit", page.limit.to_string())]
    }

    // ===== Owners =====

    pub async fn list_owners(&self, page: Page) -> Result<Vec<Owner>, ApiError> {
        self.get(OWNER_PATH, &Self::page_query(page)).await
    }

    pub async fn get_owner(&self, id: Uuid) -> Result<Owner, ApiError> {
        self.get(&format!("{}/{}", OWNER_PATH, id), &[]).await
    }

    pub async fn create_owner(&self, draft: &OwnerDraft) -> Result<Owner, ApiError> {
        draft.validate()?;
        self.send_json(Method::POST, OWNER_PATH, &draft.normalized()).await
    }

    pub async fn update_owner(&self, id: Uuid, draft: &OwnerDraft) -> Result<Owner, ApiError> {
        draft.validate()?;
        self.send_json(Method::PUT, &format!("{}/{}", OWNER_PATH, id), &draft.normalized())
            .await
    }

    pub async fn delete_owner(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("{}/{}", OWNER_PATH, id)).await
    }

    // ===== Assets =====

    pub async fn list_assets(&self, page: Page) -> Result<Vec<Asset>, ApiError> {
        self.get(ASSET_PATH, &Self::page_query(page)).await
    }

    pub async fn get_asset(&self, id: Uuid) -> Result<Asset, ApiError> {
        self.get(&format!("{}/{}", ASSET_PATH, id), &[]).await
    }

    pub async fn create_asset(&self, draft: &AssetDraft) -> Result<Asset, ApiError> {
        let payload = draft.validate()?;
        self.send_json(Method::POST, ASSET_PATH, &payload).await
    }

    pub async fn update_asset(&self, id: Uuid, draft: &AssetDraft) -> Result<Asset, ApiError> {
        let payload = draft.validate()?;
        self.send_json(Method::PUT, &format!("{}/{}", ASSET_PATH, id), &payload)
            .await
    }

    pub async fn delete_asset(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("{}/{}", ASSET_PATH, id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LocalSessionStore, MemoryStorage, SystemClock};

    fn client(base: &str) -> ApiClient {
        let store = LocalSessionStore::new(Arc::new(MemoryStorage::new()), Arc::new(SystemClock));
        ApiClient::with_base_url(base, Duration::from_secs(1), Arc::new(store)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = client("http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url(OWNER_PATH), "http://localhost:8000/integrations/owner");
    }

    #[test]
    fn test_default_page() {
        let query = ApiClient::page_query(Page::default());
        assert_eq!(query[0], ("skip", "0".to_string()));
        assert_eq!(query[1], ("limit", "100".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_draft_fails_before_network() {
        // Port 9 (discard) is never contacted: validation fails first
        let api = client("http://127.0.0.1:9");
        let err = api.create_owner(&OwnerDraft::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = api.create_asset(&AssetDraft::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
