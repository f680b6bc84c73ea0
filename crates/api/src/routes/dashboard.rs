//! Dashboard route.

use axum::{Json, Router, extract::State, routing::get};

use crate::{AppState, error::ApiResult, middleware::AuthUser};
use jobledger_core::reports::ContractorSummary;
use jobledger_db::ReportRepository;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// GET /dashboard - Totals across the contractor's projects.
async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ContractorSummary>> {
    let repo = ReportRepository::new((*state.db).clone());
    let summary = repo.contractor_summary(auth.contractor_id()).await?;
    Ok(Json(summary))
}
