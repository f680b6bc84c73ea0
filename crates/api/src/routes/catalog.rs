//! Catalog routes: assets, employees and material templates.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::validate;
use crate::{AppState, error::ApiResult, middleware::AuthUser};
use jobledger_core::billing::{MaterialUsage, Rates};
use jobledger_db::{
    CatalogRepository,
    entities::{assets, employees, materials},
    repositories::{MaterialInput, RateSourceInput},
};
use jobledger_shared::types::{parse_amount, parse_optional_amount};

/// Creates the catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route("/assets/{id}", put(update_asset).delete(delete_asset))
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/{id}", put(update_employee).delete(delete_employee))
        .route("/materials", get(list_materials).post(create_material))
        .route("/materials/templates", get(material_templates))
        .route("/materials/{id}", put(update_material).delete(delete_material))
}

/// Request body for an asset or employee.
#[derive(Debug, Deserialize, Validate)]
pub struct RateSourceRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Cost per hour, as text.
    pub cost_rate: String,
    /// Billable rate per hour, as text.
    pub billable_rate: String,
}

impl RateSourceRequest {
    fn into_input(self) -> ApiResult<RateSourceInput> {
        let rates = Rates::new(
            parse_amount("cost_rate", &self.cost_rate)?,
            parse_amount("billable_rate", &self.billable_rate)?,
        )?;
        Ok(RateSourceInput {
            name: self.name,
            rates,
        })
    }
}

/// Request body for a material template.
#[derive(Debug, Deserialize, Validate)]
pub struct MaterialRequest {
    /// What the material is.
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    /// Pricing unit.
    #[validate(length(max = 50))]
    #[serde(default)]
    pub unit: String,
    /// Cost per unit, as text.
    pub actual_cost: String,
    /// Markup percent, as text; blank uses the contractor margin.
    pub service_markup: Option<String>,
}

impl MaterialRequest {
    fn into_input(self) -> ApiResult<MaterialInput> {
        let pricing = MaterialUsage::new(
            parse_amount("actual_cost", &self.actual_cost)?,
            parse_optional_amount("service_markup", self.service_markup.as_deref())?,
        )?;
        Ok(MaterialInput {
            description: self.description,
            unit: self.unit,
            pricing,
        })
    }
}

/// Material template as offered to entry forms.
#[derive(Debug, Serialize)]
pub struct MaterialTemplate {
    /// Material ID, passed back as `material_id`.
    pub id: Uuid,
    /// Description copied onto the entry.
    pub description: String,
    /// Unit copied onto the entry.
    pub unit: String,
    /// Cost per unit copied onto the entry.
    pub material_cost: Decimal,
    /// Markup copied onto the entry.
    pub service_markup: Option<Decimal>,
}

impl From<materials::Model> for MaterialTemplate {
    fn from(m: materials::Model) -> Self {
        Self {
            id: m.id,
            description: m.description,
            unit: m.unit,
            material_cost: m.actual_cost,
            service_markup: m.service_markup,
        }
    }
}

fn repo(state: &AppState) -> CatalogRepository {
    CatalogRepository::new((*state.db).clone())
}

// ============================================================================
// Assets
// ============================================================================

/// GET /assets
async fn list_assets(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<assets::Model>>> {
    Ok(Json(repo(&state).list_assets(auth.contractor_id()).await?))
}

/// POST /assets
async fn create_asset(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RateSourceRequest>,
) -> ApiResult<(StatusCode, Json<assets::Model>)> {
    validate(&payload)?;
    let asset = repo(&state)
        .create_asset(auth.contractor_id(), payload.into_input()?)
        .await?;
    info!(asset_id = %asset.id, contractor_id = %auth.contractor_id(), "Asset created");
    Ok((StatusCode::CREATED, Json(asset)))
}

/// PUT /assets/{id}
async fn update_asset(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateSourceRequest>,
) -> ApiResult<Json<assets::Model>> {
    validate(&payload)?;
    let asset = repo(&state)
        .update_asset(auth.contractor_id(), id, payload.into_input()?)
        .await?;
    Ok(Json(asset))
}

/// DELETE /assets/{id}
async fn delete_asset(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).delete_asset(auth.contractor_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Employees
// ============================================================================

/// GET /employees
async fn list_employees(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<employees::Model>>> {
    Ok(Json(repo(&state).list_employees(auth.contractor_id()).await?))
}

/// POST /employees
async fn create_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RateSourceRequest>,
) -> ApiResult<(StatusCode, Json<employees::Model>)> {
    validate(&payload)?;
    let employee = repo(&state)
        .create_employee(auth.contractor_id(), payload.into_input()?)
        .await?;
    info!(employee_id = %employee.id, contractor_id = %auth.contractor_id(), "Employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PUT /employees/{id}
async fn update_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateSourceRequest>,
) -> ApiResult<Json<employees::Model>> {
    validate(&payload)?;
    let employee = repo(&state)
        .update_employee(auth.contractor_id(), id, payload.into_input()?)
        .await?;
    Ok(Json(employee))
}

/// DELETE /employees/{id}
async fn delete_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).delete_employee(auth.contractor_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Materials
// ============================================================================

/// GET /materials
async fn list_materials(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<materials::Model>>> {
    Ok(Json(repo(&state).list_materials(auth.contractor_id()).await?))
}

/// GET /materials/templates - Material defaults for entry forms.
async fn material_templates(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<MaterialTemplate>>> {
    let materials = repo(&state).list_materials(auth.contractor_id()).await?;
    Ok(Json(materials.into_iter().map(MaterialTemplate::from).collect()))
}

/// POST /materials
async fn create_material(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<MaterialRequest>,
) -> ApiResult<(StatusCode, Json<materials::Model>)> {
    validate(&payload)?;
    let material = repo(&state)
        .create_material(auth.contractor_id(), payload.into_input()?)
        .await?;
    info!(material_id = %material.id, contractor_id = %auth.contractor_id(), "Material created");
    Ok((StatusCode::CREATED, Json(material)))
}

/// PUT /materials/{id}
async fn update_material(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaterialRequest>,
) -> ApiResult<Json<materials::Model>> {
    validate(&payload)?;
    let material = repo(&state)
        .update_material(auth.contractor_id(), id, payload.into_input()?)
        .await?;
    Ok(Json(material))
}

/// DELETE /materials/{id}
async fn delete_material(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).delete_material(auth.contractor_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
