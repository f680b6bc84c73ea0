//! Contractor profile routes.

use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::validate;
use crate::{AppState, error::ApiResult, middleware::AuthUser};
use jobledger_core::billing::Margin;
use jobledger_db::{
    ContractorRepository, entities::contractors, repositories::UpdateContractorInput,
};
use jobledger_shared::types::parse_amount;

/// Creates the contractor routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/contractor", get(get_contractor).put(update_contractor))
}

/// Request body for updating the contractor profile. Absent fields are
/// left unchanged; an empty phone or logo URL clears it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContractorRequest {
    /// Business name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// Contact phone.
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Logo location.
    #[validate(length(max = 500))]
    pub logo_url: Option<String>,
    /// Material margin percent, as text.
    pub material_margin: Option<String>,
}

impl UpdateContractorRequest {
    fn into_input(self) -> ApiResult<UpdateContractorInput> {
        let material_margin = match self.material_margin.as_deref() {
            Some(raw) => Some(Margin::new(parse_amount("material_margin", raw)?)?),
            None => None,
        };
        Ok(UpdateContractorInput {
            name: self.name.map(|n| n.trim().to_string()),
            phone: self.phone.map(clearable),
            logo_url: self.logo_url.map(clearable),
            material_margin,
        })
    }
}

fn clearable(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// GET /contractor - The authenticated contractor's profile.
async fn get_contractor(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<contractors::Model>> {
    let repo = ContractorRepository::new((*state.db).clone());
    Ok(Json(repo.find_by_id(auth.contractor_id()).await?))
}

/// PUT /contractor - Update profile and material margin.
async fn update_contractor(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateContractorRequest>,
) -> ApiResult<Json<contractors::Model>> {
    validate(&payload)?;
    let input = payload.into_input()?;
    let repo = ContractorRepository::new((*state.db).clone());

    let contractor = repo.update(auth.contractor_id(), input).await?;
    info!(user_id = %auth.user_id(), contractor_id = %contractor.id, "Contractor profile updated");
    Ok(Json(contractor))
}
