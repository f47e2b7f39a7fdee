//! Chart-of-accounts and transaction endpoints, scoped per organization.

use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub organization_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Double-entry posting between two accounts. Amounts mirror the backend's
/// JSON numbers; the client performs no arithmetic on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub organization_id: String,
    pub debit_account_id: String,
    pub credit_account_id: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub debit_account_id: String,
    pub credit_account_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debit_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Server-side transaction list filter; every field optional.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TransactionFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(account_id) = &self.account_id {
            query.push(("accountId", account_id.clone()));
        }
        if let Some(start_date) = &self.start_date {
            query.push(("startDate", start_date.clone()));
        }
        if let Some(end_date) = &self.end_date {
            query.push(("endDate", end_date.clone()));
        }
        query
    }
}

// =============================================================================
// ACCOUNTS
// =============================================================================

pub async fn get_accounts(
    client: &ApiClient,
    organization_id: &str,
    include_inactive: bool,
) -> Result<Vec<Account>, ApiError> {
    client
        .get_with(
            &format!("/organizations/{organization_id}/accounts"),
            &[("includeInactive", include_inactive.to_string())],
        )
        .await
}

pub async fn get_account(
    client: &ApiClient,
    organization_id: &str,
    account_id: &str,
) -> Result<Account, ApiError> {
    client.get(&format!("/organizations/{organization_id}/accounts/{account_id}")).await
}

pub async fn create_account(
    client: &ApiClient,
    organization_id: &str,
    data: &CreateAccount,
) -> Result<Account, ApiError> {
    client.post(&format!("/organizations/{organization_id}/accounts"), data).await
}

pub async fn update_account(
    client: &ApiClient,
    organization_id: &str,
    account_id: &str,
    data: &UpdateAccount,
) -> Result<Account, ApiError> {
    client
        .patch(&format!("/organizations/{organization_id}/accounts/{account_id}"), data)
        .await
}

pub async fn delete_account(
    client: &ApiClient,
    organization_id: &str,
    account_id: &str,
) -> Result<(), ApiError> {
    client.delete(&format!("/organizations/{organization_id}/accounts/{account_id}")).await
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

pub async fn get_transactions(
    client: &ApiClient,
    organization_id: &str,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>, ApiError> {
    client
        .get_with(
            &format!("/organizations/{organization_id}/transactions"),
            &filter.to_query(),
        )
        .await
}

pub async fn get_transaction(
    client: &ApiClient,
    organization_id: &str,
    transaction_id: &str,
) -> Result<Transaction, ApiError> {
    client
        .get(&format!("/organizations/{organization_id}/transactions/{transaction_id}"))
        .await
}

pub async fn create_transaction(
    client: &ApiClient,
    organization_id: &str,
    data: &CreateTransaction,
) -> Result<Transaction, ApiError> {
    client.post(&format!("/organizations/{organization_id}/transactions"), data).await
}

pub async fn update_transaction(
    client: &ApiClient,
    organization_id: &str,
    transaction_id: &str,
    data: &UpdateTransaction,
) -> Result<Transaction, ApiError> {
    client
        .patch(
            &format!("/organizations/{organization_id}/transactions/{transaction_id}"),
            data,
        )
        .await
}

pub async fn delete_transaction(
    client: &ApiClient,
    organization_id: &str,
    transaction_id: &str,
) -> Result<(), ApiError> {
    client
        .delete(&format!("/organizations/{organization_id}/transactions/{transaction_id}"))
        .await
}

#[cfg(test)]
#[path = "accounting_test.rs"]
mod tests;
