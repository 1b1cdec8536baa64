// src/handlers/accounts.rs

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

use crate::{common::error::AppError, config::AppState, models::crm::Account};

// POST and PUT share one shape; PUT has full-resend semantics, so omitted
// optionals are cleared.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Acme")]
    pub name: String,

    #[schema(example = "Software")]
    pub industry: Option<String>,

    #[schema(example = "https://acme.example")]
    pub website: Option<String>,
}

// GET /accounts
#[utoipa::path(
    get,
    path = "/accounts",
    tag = "Accounts",
    responses(
        (status = 200, description = "All accounts, newest first", body = Vec<Account>)
    )
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let accounts = app_state.crm_service.list_accounts(&app_state.db_pool).await?;

    Ok((StatusCode::OK, Json(accounts)))
}

// POST /accounts
#[utoipa::path(
    post,
    path = "/accounts",
    tag = "Accounts",
    request_body = AccountPayload,
    responses(
        (status = 201, description = "Account created", body = Account),
        (status = 400, description = "Missing name")
    )
)]
pub async fn create_account(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let account = app_state
        .crm_service
        .create_account(
            &app_state.db_pool,
            &payload.name,
            payload.industry.as_deref(),
            payload.website.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

// PUT /accounts/{id}
#[utoipa::path(
    put,
    path = "/accounts/{id}",
    tag = "Accounts",
    request_body = AccountPayload,
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account updated", body = Account),
        (status = 400, description = "Unknown id or invalid payload")
    )
)]
pub async fn update_account(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let account = app_state
        .crm_service
        .update_account(
            &app_state.db_pool,
            id,
            &payload.name,
            payload.industry.as_deref(),
            payload.website.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(account)))
}

// DELETE /accounts/{id}
#[utoipa::path(
    delete,
    path = "/accounts/{id}",
    tag = "Accounts",
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account and its opportunities deleted"),
        (status = 409, description = "Related records still exist"),
        (status = 400, description = "Unknown id")
    )
)]
pub async fn delete_account(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.crm_service.delete_account(&app_state.db_pool, id).await?;

    Ok((StatusCode::OK, Json(json!({ "ok": true }))))
}
