//! Dashboard summary endpoint.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::DashboardSummary;
use crate::AppState;

/// GET /api/dashboard - Aggregated counts and totals.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    match state.repo.dashboard_summary().await {
        Ok(summary) => success(summary),
        Err(e) => error(e),
    }
}
