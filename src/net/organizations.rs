//! Organization endpoints: CRUD and membership management.

use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrganization {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateOrganization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationRole {
    Owner,
    Accountant,
    Viewer,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddUser {
    pub email: String,
    pub role: OrganizationRole,
}

pub async fn get_all(client: &ApiClient) -> Result<Vec<Organization>, ApiError> {
    client.get("/organizations").await
}

pub async fn get_by_id(client: &ApiClient, id: &str) -> Result<Organization, ApiError> {
    client.get(&format!("/organizations/{id}")).await
}

pub async fn create(client: &ApiClient, data: &CreateOrganization) -> Result<Organization, ApiError> {
    client.post("/organizations", data).await
}

pub async fn update(
    client: &ApiClient,
    id: &str,
    data: &UpdateOrganization,
) -> Result<Organization, ApiError> {
    client.patch(&format!("/organizations/{id}"), data).await
}

pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/organizations/{id}")).await
}

pub async fn add_user(client: &ApiClient, organization_id: &str, data: &AddUser) -> Result<(), ApiError> {
    client.post_unit(&format!("/organizations/{organization_id}/users"), data).await
}

pub async fn remove_user(client: &ApiClient, organization_id: &str, user_id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/organizations/{organization_id}/users/{user_id}")).await
}
