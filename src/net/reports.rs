//! Financial report endpoints: balance, profit & loss, cash flow.

use serde::{Deserialize, Serialize};

use super::accounting::AccountType;
use super::client::ApiClient;
use crate::error::ApiError;

/// Common report query: open date bounds plus inactive-account inclusion.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub include_inactive: Option<bool>,
}

impl ReportQuery {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(date_from) = &self.date_from {
            query.push(("dateFrom", date_from.clone()));
        }
        if let Some(date_to) = &self.date_to {
            query.push(("dateTo", date_to.clone()));
        }
        if let Some(include_inactive) = self.include_inactive {
            query.push(("includeInactive", include_inactive.to_string()));
        }
        query
    }
}

// =============================================================================
// BALANCE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReportItem {
    pub account_id: String,
    pub account_code: String,
    pub account_name: String,
    pub account_type: String,
    pub opening_balance: f64,
    /// Debit turnover over the period.
    pub debit: f64,
    /// Credit turnover over the period.
    pub credit: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReportSection {
    #[serde(rename = "type")]
    pub section_type: AccountType,
    pub type_label: String,
    pub items: Vec<BalanceReportItem>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub organization_id: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub generated_at: String,
    pub assets: BalanceReportSection,
    pub liabilities: BalanceReportSection,
    pub equity: BalanceReportSection,
    pub total_assets: f64,
    pub total_liabilities_and_equity: f64,
}

// =============================================================================
// PROFIT & LOSS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossReportItem {
    pub account_id: String,
    pub account_code: String,
    pub account_name: String,
    pub account_type: String,
    pub debit: f64,
    pub credit: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossReportSection {
    #[serde(rename = "type")]
    pub section_type: AccountType,
    pub type_label: String,
    pub items: Vec<ProfitLossReportItem>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossReport {
    pub organization_id: String,
    pub date_from: String,
    pub date_to: String,
    pub generated_at: String,
    pub revenue: ProfitLossReportSection,
    pub expenses: ProfitLossReportSection,
    pub gross_profit: f64,
    pub net_profit: f64,
}

// =============================================================================
// CASH FLOW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowItem {
    pub account_id: String,
    pub account_code: String,
    pub account_name: String,
    pub inflow: f64,
    pub outflow: f64,
    pub net_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowSection {
    pub category: String,
    pub items: Vec<CashFlowItem>,
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub net_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowReport {
    pub organization_id: String,
    pub date_from: String,
    pub date_to: String,
    pub generated_at: String,
    pub operating: CashFlowSection,
    pub investing: CashFlowSection,
    pub financing: CashFlowSection,
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub net_cash_flow: f64,
    pub opening_balance: f64,
    pub closing_balance: f64,
}

// =============================================================================
// ENDPOINTS
// =============================================================================

pub async fn get_balance_report(
    client: &ApiClient,
    organization_id: &str,
    query: &ReportQuery,
) -> Result<BalanceReport, ApiError> {
    client
        .get_with(
            &format!("/organizations/{organization_id}/reports/balance"),
            &query.to_query(),
        )
        .await
}

pub async fn get_profit_loss_report(
    client: &ApiClient,
    organization_id: &str,
    query: &ReportQuery,
) -> Result<ProfitLossReport, ApiError> {
    client
        .get_with(
            &format!("/organizations/{organization_id}/reports/profit-loss"),
            &query.to_query(),
        )
        .await
}

pub async fn get_cash_flow_report(
    client: &ApiClient,
    organization_id: &str,
    query: &ReportQuery,
) -> Result<CashFlowReport, ApiError> {
    client
        .get_with(
            &format!("/organizations/{organization_id}/reports/cash-flow"),
            &query.to_query(),
        )
        .await
}

#[cfg(test)]
#[path = "reports_test.rs"]
mod tests;
