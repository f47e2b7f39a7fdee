//! Authentication endpoints.

use serde::{Deserialize, Serialize};

use super::client::{ApiClient, TokenPair};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Current user record, persisted as JSON under the `user` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

pub async fn register(client: &ApiClient, data: &RegisterRequest) -> Result<AuthResponse, ApiError> {
    client.post("/auth/register", data).await
}

pub async fn login(client: &ApiClient, data: &LoginRequest) -> Result<AuthResponse, ApiError> {
    client.post("/auth/login", data).await
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

/// Explicit refresh. The HTTP wrapper runs its own recovery refresh
/// internally; this wrapper-routed variant exists for callers that refresh
/// proactively.
pub async fn refresh(client: &ApiClient, refresh_token: &str) -> Result<TokenPair, ApiError> {
    client.post("/auth/refresh", &RefreshBody { refresh_token }).await
}
