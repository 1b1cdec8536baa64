// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Lead.status and Opportunity.stage are open string enumerations: the store
// accepts any value and the dashboard buckets unknowns instead of rejecting
// them. Only the well-known defaults live here as constants.

pub const LEAD_STATUS_NEW: &str = "NEW";
pub const LEAD_STATUS_QUALIFIED: &str = "QUALIFIED";
pub const OPP_STAGE_PROSPECTING: &str = "PROSPECTING";

/// A business entity that can own opportunities.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A prospective contact. Conversion flips the status to QUALIFIED but never
/// deletes the record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub full_name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A tracked potential deal tied to exactly one account. Immutable after
/// creation. A missing amount means "unknown", not zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: Uuid,
    pub name: String,
    pub stage: String,
    pub amount: Option<f64>,
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// What a lead conversion produces: the account derived from the lead plus
/// the opportunity seeded under it.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadConversion {
    pub account: Account,
    pub opp: Opportunity,
}
