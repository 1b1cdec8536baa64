// src/handlers/opps.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::crm::Opportunity};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityPayload {
    // Option so a missing field reports "accountId is required" instead of
    // a deserialization error; a malformed uuid is still rejected by serde.
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub account_id: Option<Uuid>,

    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Enterprise rollout")]
    pub name: String,

    #[validate(range(min = 0.0, message = "amount must be non-negative"))]
    #[schema(example = 25000.0)]
    pub amount: Option<f64>,
}

// GET /opps
#[utoipa::path(
    get,
    path = "/opps",
    tag = "Opportunities",
    responses(
        (status = 200, description = "All opportunities, newest first", body = Vec<Opportunity>)
    )
)]
pub async fn list_opportunities(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let opps = app_state.crm_service.list_opportunities(&app_state.db_pool).await?;

    Ok((StatusCode::OK, Json(opps)))
}

// POST /opps
#[utoipa::path(
    post,
    path = "/opps",
    tag = "Opportunities",
    request_body = CreateOpportunityPayload,
    responses(
        (status = 201, description = "Opportunity created", body = Opportunity),
        (status = 400, description = "Missing accountId/name, or unknown account")
    )
)]
pub async fn create_opportunity(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateOpportunityPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let Some(account_id) = payload.account_id else {
        return Err(AppError::required("accountId"));
    };

    let opp = app_state
        .crm_service
        .create_opportunity(&app_state.db_pool, account_id, &payload.name, payload.amount)
        .await?;

    Ok((StatusCode::CREATED, Json(opp)))
}
