// src/handlers/dashboard.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{common::error::AppError, config::AppState, models::dashboard::DashboardSummary};

// GET /dashboard/summary
#[utoipa::path(
    get,
    path = "/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Counts, revenue, conversion rate and chart series", body = DashboardSummary)
    )
)]
pub async fn get_summary(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.get_summary(&app_state.db_pool).await?;

    Ok((StatusCode::OK, Json(summary)))
}
