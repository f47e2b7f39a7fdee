//! Authenticated HTTP client wrapper.
//!
//! ARCHITECTURE
//! ============
//! Every outgoing request reads the persisted access token and attaches it
//! as a bearer header. A 401 response triggers at most one refresh-and-retry
//! cycle per physical request, tracked by a local flag plus a per-call
//! correlation id, so concurrent requests never share retry state. The
//! refresh call itself goes through the bare `reqwest` client, never through
//! this wrapper, so the interceptor cannot intercept its own recovery
//! traffic. Credential-submission endpoints are exempt from recovery: a 401
//! there means bad credentials, not an expired token.
//!
//! Irrecoverable 401s (no refresh token, or the refresh itself failing)
//! clear the persisted session and land on the login route.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorBody};
use crate::router::{Navigator, Route};
use crate::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, Storage, USER_KEY};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const REFRESH_PATH: &str = "/auth/refresh";

/// Token pair returned by the refresh endpoint.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn Storage>,
    navigator: Navigator,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn Storage>,
        navigator: Navigator,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|err| ApiError::Build(err.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), storage, navigator })
    }

    // =========================================================================
    // TYPED HELPERS
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, None, None::<&()>).await?;
        response.json::<T>().await.map_err(ApiError::from)
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, Some(query), None::<&()>).await?;
        response.json::<T>().await.map_err(ApiError::from)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::POST, path, None, Some(body)).await?;
        response.json::<T>().await.map_err(ApiError::from)
    }

    /// POST where the response body is irrelevant to the caller.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.request(Method::POST, path, None, Some(body)).await.map(|_| ())
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::PATCH, path, None, Some(body)).await?;
        response.json::<T>().await.map_err(ApiError::from)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, None, None::<&()>).await.map(|_| ())
    }

    // =========================================================================
    // REQUEST PIPELINE
    // =========================================================================

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let correlation = Uuid::new_v4();
        let mut retried = false;
        let mut bearer = self.storage.get(ACCESS_TOKEN_KEY);

        loop {
            let mut builder = self
                .http
                .request(method.clone(), format!("{}{path}", self.base_url));
            if let Some(query) = query {
                builder = builder.query(query);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }
            if let Some(token) = &bearer {
                builder = builder.bearer_auth(token);
            }

            tracing::debug!(%correlation, %method, path, retried, "api request");
            let response = builder.send().await.map_err(ApiError::from)?;

            if response.status() == StatusCode::UNAUTHORIZED && !retried && !is_credential_endpoint(path) {
                retried = true;
                tracing::info!(%correlation, path, "access rejected, attempting token refresh");

                let Some(refresh_token) = self.storage.get(REFRESH_TOKEN_KEY) else {
                    tracing::warn!(%correlation, "no stored refresh token, forcing logout");
                    self.force_logout();
                    return Self::into_result(response).await;
                };
                match self.refresh_token_pair(&refresh_token).await {
                    Ok(pair) => {
                        bearer = Some(pair.access_token);
                    }
                    Err(err) => {
                        tracing::warn!(%correlation, error = %err, "token refresh failed, forcing logout");
                        self.force_logout();
                        return Err(err);
                    }
                }
                continue;
            }

            return Self::into_result(response).await;
        }
    }

    /// Success passes through; any failure status becomes `ApiError::Status`
    /// with whatever error body the backend sent.
    async fn into_result(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.json::<ErrorBody>().await.ok();
        Err(ApiError::Status { status, body })
    }

    /// Mint a new token pair from the refresh endpoint and persist it.
    ///
    /// Deliberately bypasses `request`: the recovery path must not be
    /// intercepted by itself.
    async fn refresh_token_pair(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let response = self
            .http
            .post(format!("{}{REFRESH_PATH}", self.base_url))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(ApiError::from)?;
        let response = Self::into_result(response).await?;
        let pair = response.json::<TokenPair>().await.map_err(ApiError::from)?;

        self.storage.set(ACCESS_TOKEN_KEY, &pair.access_token);
        self.storage.set(REFRESH_TOKEN_KEY, &pair.refresh_token);
        Ok(pair)
    }

    fn force_logout(&self) {
        self.storage.remove(ACCESS_TOKEN_KEY);
        self.storage.remove(REFRESH_TOKEN_KEY);
        self.storage.remove(USER_KEY);
        if self.navigator.current() != Route::Login {
            self.navigator.push(Route::Login);
        }
    }
}

/// A 401 from these endpoints is a genuine bad-credentials response, never an
/// expiry.
fn is_credential_endpoint(path: &str) -> bool {
    path == LOGIN_PATH || path == REGISTER_PATH
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
