//! Job entry routes, plus the entry request body shared with estimates.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::validate;
use crate::{AppState, error::ApiResult, middleware::AuthUser};
use jobledger_db::{EntryRepository, entities::job_entries, repositories::EntryInput};
use jobledger_shared::{
    AppError,
    types::{parse_amount, parse_optional_amount},
};

/// Creates the job entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/{id}/entries", get(list_entries).post(create_entry))
        .route("/entries/{id}", put(update_entry).delete(delete_entry))
}

/// Request body for a job or estimate entry.
///
/// Numbers arrive as text; blank material fields are filled from the
/// selected material template when one is given.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EntryRequest {
    /// Work date; required for job entries, ignored for estimates.
    pub date: Option<NaiveDate>,
    /// Hours worked or quantity of material.
    #[serde(default)]
    pub hours: String,
    /// Asset used.
    pub asset_id: Option<Uuid>,
    /// Employee who worked.
    pub employee_id: Option<Uuid>,
    /// Material template.
    pub material_id: Option<Uuid>,
    /// Material description.
    #[validate(length(max = 255))]
    pub material_description: Option<String>,
    /// Material unit.
    #[validate(length(max = 50))]
    pub material_unit: Option<String>,
    /// Material cost per unit, as text.
    pub material_cost: Option<String>,
    /// Markup percent, as text.
    pub service_markup: Option<String>,
    /// What was done.
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
}

impl EntryRequest {
    /// Validates the body and converts it into repository input.
    pub(crate) fn into_input(self) -> ApiResult<EntryInput> {
        validate(&self)?;
        Ok(EntryInput {
            hours: parse_amount("hours", &self.hours)?,
            asset_id: self.asset_id,
            employee_id: self.employee_id,
            material_id: self.material_id,
            material_description: non_blank(self.material_description),
            material_unit: non_blank(self.material_unit),
            material_cost: parse_optional_amount("material_cost", self.material_cost.as_deref())?,
            service_markup: parse_optional_amount("service_markup", self.service_markup.as_deref())?,
            description: self.description.trim().to_string(),
        })
    }

    fn into_dated_input(self) -> ApiResult<(NaiveDate, EntryInput)> {
        let date = self
            .date
            .ok_or_else(|| AppError::invalid_field("date", "is required"))?;
        Ok((date, self.into_input()?))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn repo(state: &AppState) -> EntryRepository {
    EntryRepository::new((*state.db).clone())
}

/// GET /projects/{id}/entries
async fn list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<job_entries::Model>>> {
    let entries = repo(&state)
        .list_job_entries(auth.contractor_id(), project_id)
        .await?;
    Ok(Json(entries))
}

/// POST /projects/{id}/entries - Prices and stores a job entry.
async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<EntryRequest>,
) -> ApiResult<(StatusCode, Json<job_entries::Model>)> {
    let (date, input) = payload.into_dated_input()?;
    let entry = repo(&state)
        .create_job_entry(auth.contractor_id(), project_id, date, input)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /entries/{id} - Replaces a job entry and reprices it.
async fn update_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EntryRequest>,
) -> ApiResult<Json<job_entries::Model>> {
    let (date, input) = payload.into_dated_input()?;
    let entry = repo(&state)
        .update_job_entry(auth.contractor_id(), id, date, input)
        .await?;
    Ok(Json(entry))
}

/// DELETE /entries/{id}
async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).delete_job_entry(auth.contractor_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
