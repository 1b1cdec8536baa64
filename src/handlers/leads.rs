// src/handlers/leads.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::crm::{Lead, LeadConversion},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "fullName is required"))]
    #[schema(example = "Jane Doe")]
    pub full_name: String,

    #[schema(example = "Acme")]
    pub company: Option<String>,

    #[schema(example = "jane@acme.example")]
    pub email: Option<String>,
}

// GET /leads
#[utoipa::path(
    get,
    path = "/leads",
    tag = "Leads",
    responses(
        (status = 200, description = "All leads, newest first", body = Vec<Lead>)
    )
)]
pub async fn list_leads(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.crm_service.list_leads(&app_state.db_pool).await?;

    Ok((StatusCode::OK, Json(leads)))
}

// POST /leads
#[utoipa::path(
    post,
    path = "/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead created with status NEW", body = Lead),
        (status = 400, description = "Missing fullName")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateLeadPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state
        .crm_service
        .create_lead(
            &app_state.db_pool,
            &payload.full_name,
            payload.company.as_deref(),
            payload.email.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// POST /leads/{id}/convert
#[utoipa::path(
    post,
    path = "/leads/{id}/convert",
    tag = "Leads",
    params(
        ("id" = Uuid, Path, description = "Lead id")
    ),
    responses(
        (status = 200, description = "Lead qualified; derived account and opportunity", body = LeadConversion),
        (status = 400, description = "Unknown lead")
    )
)]
pub async fn convert_lead(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let conversion = app_state.crm_service.convert_lead(&app_state.db_pool, id).await?;

    Ok((StatusCode::OK, Json(conversion)))
}

// DELETE /leads/{id}
#[utoipa::path(
    delete,
    path = "/leads/{id}",
    tag = "Leads",
    params(
        ("id" = Uuid, Path, description = "Lead id")
    ),
    responses(
        (status = 200, description = "Lead deleted"),
        (status = 400, description = "Unknown lead")
    )
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.crm_service.delete_lead(&app_state.db_pool, id).await?;

    Ok((StatusCode::OK, Json(json!({ "ok": true }))))
}
