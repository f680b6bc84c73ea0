//! Project and payment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::validate;
use crate::{AppState, error::ApiResult, middleware::AuthUser};
use jobledger_core::reports::{DateRange, ProjectAnalytics};
use jobledger_db::{
    EntryRepository, ProjectRepository, ReportRepository,
    entities::{job_entries, payments, projects},
    repositories::{PaymentInput, ProjectInput},
};
use jobledger_shared::types::parse_amount;

/// Creates the project routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/{id}/payments", get(list_payments).post(add_payment))
        .route("/projects/{id}/analytics", get(get_analytics))
        .route("/payments/{id}", delete(delete_payment))
}

/// Request body for creating or replacing a project.
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// First day of work.
    pub start_date: NaiveDate,
    /// Last day of work.
    pub end_date: Option<NaiveDate>,
}

impl From<ProjectRequest> for ProjectInput {
    fn from(req: ProjectRequest) -> Self {
        Self {
            name: req.name,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    /// Amount received, as text.
    pub amount: String,
    /// Day it was received; defaults to today.
    pub date: Option<NaiveDate>,
    /// Check number, method and the like.
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub notes: String,
}

impl PaymentRequest {
    fn into_input(self, today: NaiveDate) -> ApiResult<PaymentInput> {
        Ok(PaymentInput {
            amount: parse_amount("amount", &self.amount)?,
            date: self.date.unwrap_or(today),
            notes: self.notes.trim().to_string(),
        })
    }
}

/// A project with its entries and payments.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    /// The project.
    #[serde(flatten)]
    pub project: projects::Model,
    /// Job entries, oldest first.
    pub entries: Vec<job_entries::Model>,
    /// Payments, oldest first.
    pub payments: Vec<payments::Model>,
}

fn repo(state: &AppState) -> ProjectRepository {
    ProjectRepository::new((*state.db).clone())
}

/// GET /projects - List projects, newest first.
async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<projects::Model>>> {
    Ok(Json(repo(&state).list(auth.contractor_id()).await?))
}

/// POST /projects
async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ProjectRequest>,
) -> ApiResult<(StatusCode, Json<projects::Model>)> {
    validate(&payload)?;
    let project = repo(&state)
        .create(auth.contractor_id(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects/{id} - Project with entries and payments.
async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    let contractor_id = auth.contractor_id();
    let projects = repo(&state);

    let project = projects.find(contractor_id, id).await?;
    let entries = EntryRepository::new((*state.db).clone())
        .list_job_entries(contractor_id, id)
        .await?;
    let payments = projects.payments(contractor_id, id).await?;

    Ok(Json(ProjectDetail {
        project,
        entries,
        payments,
    }))
}

/// PUT /projects/{id}
async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProjectRequest>,
) -> ApiResult<Json<projects::Model>> {
    validate(&payload)?;
    let project = repo(&state)
        .update(auth.contractor_id(), id, payload.into())
        .await?;
    Ok(Json(project))
}

/// DELETE /projects/{id} - Removes the project with its entries and payments.
async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).delete(auth.contractor_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /projects/{id}/payments
async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<payments::Model>>> {
    Ok(Json(repo(&state).payments(auth.contractor_id(), id).await?))
}

/// POST /projects/{id}/payments
async fn add_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<payments::Model>)> {
    validate(&payload)?;
    let input = payload.into_input(Utc::now().date_naive())?;
    let payment = repo(&state)
        .add_payment(auth.contractor_id(), id, input)
        .await?;
    info!(payment_id = %payment.id, project_id = %id, amount = %payment.amount, "Payment recorded");
    Ok((StatusCode::CREATED, Json(payment)))
}

/// DELETE /payments/{id}
async fn delete_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).delete_payment(auth.contractor_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /projects/{id}/analytics?from=&to= - Daily series and breakdowns.
async fn get_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(range): Query<DateRange>,
) -> ApiResult<Json<ProjectAnalytics>> {
    let reports = ReportRepository::new((*state.db).clone());
    let analytics = reports
        .project_analytics(auth.contractor_id(), id, range)
        .await?;
    Ok(Json(analytics))
}
