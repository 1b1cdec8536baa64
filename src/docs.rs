// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Accounts ---
        handlers::accounts::list_accounts,
        handlers::accounts::create_account,
        handlers::accounts::update_account,
        handlers::accounts::delete_account,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::convert_lead,
        handlers::leads::delete_lead,

        // --- Opportunities ---
        handlers::opps::list_opportunities,
        handlers::opps::create_opportunity,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            models::crm::Account,
            models::crm::Lead,
            models::crm::Opportunity,
            models::crm::LeadConversion,

            models::dashboard::DashboardSummary,
            models::dashboard::StageCount,
            models::dashboard::StatusCount,
            models::dashboard::MonthlyRevenue,

            // --- Payloads ---
            handlers::accounts::AccountPayload,
            handlers::leads::CreateLeadPayload,
            handlers::opps::CreateOpportunityPayload,
        )
    ),
    tags(
        (name = "Accounts", description = "Business accounts that own opportunities"),
        (name = "Leads", description = "Prospective contacts and lead conversion"),
        (name = "Opportunities", description = "Potential deals tied to accounts"),
        (name = "Dashboard", description = "Derived metrics and chart series")
    )
)]
pub struct ApiDoc;
