// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

// Everything here is derived from the entity lists on each request; nothing
// is persisted.

/// The metric cards plus the three chart series.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_accounts: u32,
    pub total_leads: u32,
    pub total_opps: u32,
    /// Sum of all opportunity amounts; an absent amount contributes 0.
    pub total_revenue: f64,
    /// Qualified leads / total leads × 100, or 0 when there are no leads.
    pub conversion_rate: f64,
    pub pipeline_by_stage: Vec<StageCount>,
    pub lead_status_distribution: Vec<StatusCount>,
    pub revenue_by_month: Vec<MonthlyRevenue>,
}

/// One bar of the pipeline chart. Blank stages are bucketed as "UNKNOWN".
#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: String,
    pub count: u32,
}

/// One slice of the lead status doughnut. Statuses are uppercased; blanks
/// fall back to "NEW".
#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub count: u32,
}

/// One point of the trailing-6-months revenue line.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    /// Bucket key, `YYYY-MM`.
    pub month: String,
    /// Display label, e.g. `"Mar 26"`.
    pub label: String,
    pub total: f64,
}
