//! HTTP transport for the inkpost backend.
//!
//! `ApiClient` wraps a shared `reqwest::Client` and routes every request
//! through the request authorizer, so callers anywhere in the
//! application get credential attachment and revocation handling without
//! asking for it. The two authentication endpoints live here as well and
//! implement [`AuthTransport`] for the session manager.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::error::ApiError;
use super::interceptor::RequestAuthorizer;
use crate::auth::store::CredentialStore;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};

/// Path of the login endpoint, relative to the API base URL
pub const LOGIN_PATH: &str = "/auth/login";

/// Path of the registration endpoint, relative to the API base URL
pub const REGISTER_PATH: &str = "/auth/register";

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The two endpoints the session manager needs from the transport.
/// A trait so tests can drive the manager without a live backend.
pub trait AuthTransport: Send + Sync {
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;
}

/// API client for the inkpost backend.
/// Clone is cheap — the reqwest client pools connections behind an Arc,
/// and clones share one authorizer.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    authorizer: Arc<RequestAuthorizer>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorizer: Arc::new(RequestAuthorizer::new(store)),
        })
    }

    /// The authorizer shared by all clones of this client.
    pub fn authorizer(&self) -> &RequestAuthorizer {
        &self.authorizer
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.client.get(self.endpoint(path));
        let response = self.send(path, builder).await?;
        Self::parse(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.client.post(self.endpoint(path)).json(body);
        let response = self.send(path, builder).await?;
        Self::parse(response).await
    }

    async fn send(
        &self,
        path: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        debug!(path, "sending request");
        let response = self.authorizer.decorate(path, builder).send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if let Some(revoked) = self.authorizer.observe(status, &body) {
            return Err(revoked);
        }
        Err(ApiError::from_status(status, &body))
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("unparseable response body: {e}")))
    }
}

impl AuthTransport for ApiClient {
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        self.post(LOGIN_PATH, request)
    }

    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send {
        self.post(REGISTER_PATH, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Arc::new(MemoryStore::new())).expect("client")
    }

    #[test]
    fn endpoint_joining_normalizes_slashes() {
        assert_eq!(
            client("http://localhost:9000").endpoint("/posts"),
            "http://localhost:9000/posts"
        );
        assert_eq!(
            client("http://localhost:9000/").endpoint("posts"),
            "http://localhost:9000/posts"
        );
        assert_eq!(
            client("http://localhost:9000").endpoint(LOGIN_PATH),
            "http://localhost:9000/auth/login"
        );
    }
}
