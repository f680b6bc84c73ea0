//! Estimate routes: headers, entries and the send/accept workflow.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{entries::EntryRequest, validate};
use crate::{AppState, error::ApiResult, middleware::AuthUser};
use jobledger_core::{
    estimate::EstimateService,
    reports::{EntryAmounts, ReportService, Totals},
};
use jobledger_db::{
    ContractorRepository, EntryRepository, EstimateRepository, ReportRepository,
    entities::{estimate_entries, estimates, projects},
    repositories::{EstimateInput, EstimateSummary},
};

/// Creates the estimate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/estimates", get(list_estimates).post(create_estimate))
        .route(
            "/estimates/{id}",
            get(get_estimate).put(update_estimate).delete(delete_estimate),
        )
        .route(
            "/estimates/{id}/entries",
            get(list_entries).post(create_entry),
        )
        .route("/estimate-entries/{id}", put(update_entry).delete(delete_entry))
        .route("/estimates/{id}/duplicate", post(duplicate_estimate))
        .route("/estimates/{id}/email", post(email_estimate))
        .route("/estimates/{id}/accept", post(accept_estimate))
}

/// Request body for an estimate header.
#[derive(Debug, Deserialize, Validate)]
pub struct EstimateRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Customer the estimate is for.
    #[validate(length(max = 200))]
    #[serde(default)]
    pub customer_name: String,
    /// Where the estimate is emailed.
    #[validate(email)]
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Notes shown to the customer.
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub notes: String,
}

impl From<EstimateRequest> for EstimateInput {
    fn from(req: EstimateRequest) -> Self {
        Self {
            name: req.name,
            customer_name: req.customer_name.trim().to_string(),
            customer_email: req
                .customer_email
                .map(|e| e.trim().to_string())
                .unwrap_or_default(),
            notes: req.notes,
        }
    }
}

/// Query for accepting an estimate.
#[derive(Debug, Deserialize)]
pub struct AcceptQuery {
    /// Start date of the new project; defaults to today.
    pub start_date: Option<NaiveDate>,
}

/// An estimate with its entries and totals.
#[derive(Debug, Serialize)]
pub struct EstimateDetail {
    /// The estimate.
    #[serde(flatten)]
    pub estimate: estimates::Model,
    /// Entries in entry order.
    pub entries: Vec<estimate_entries::Model>,
    /// Totals over the entries.
    pub totals: Totals,
}

/// Result of accepting an estimate.
#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    /// The now read-only estimate.
    pub estimate: estimates::Model,
    /// The project created from it.
    pub project: projects::Model,
}

/// Result of emailing an estimate.
#[derive(Debug, Serialize)]
pub struct EmailResponse {
    /// Recipient address.
    pub sent_to: String,
    /// The estimate after the send.
    pub estimate: estimates::Model,
}

fn repo(state: &AppState) -> EstimateRepository {
    EstimateRepository::new((*state.db).clone())
}

fn entry_repo(state: &AppState) -> EntryRepository {
    EntryRepository::new((*state.db).clone())
}

fn totals(entries: &[estimate_entries::Model]) -> Totals {
    let amounts: Vec<EntryAmounts> = entries
        .iter()
        .map(|e| EntryAmounts {
            cost_amount: e.cost_amount,
            billable_amount: e.billable_amount,
        })
        .collect();
    ReportService::totals(&amounts)
}

/// GET /estimates - Estimates with totals, newest first.
async fn list_estimates(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<EstimateSummary>>> {
    Ok(Json(repo(&state).list(auth.contractor_id()).await?))
}

/// POST /estimates - Creates a draft.
async fn create_estimate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<EstimateRequest>,
) -> ApiResult<(StatusCode, Json<estimates::Model>)> {
    validate(&payload)?;
    let estimate = repo(&state)
        .create(auth.contractor_id(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(estimate)))
}

/// GET /estimates/{id}
async fn get_estimate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EstimateDetail>> {
    let contractor_id = auth.contractor_id();
    let estimate = repo(&state).find(contractor_id, id).await?;
    let entries = entry_repo(&state)
        .list_estimate_entries(contractor_id, id)
        .await?;
    let totals = totals(&entries);

    Ok(Json(EstimateDetail {
        estimate,
        entries,
        totals,
    }))
}

/// PUT /estimates/{id}
async fn update_estimate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EstimateRequest>,
) -> ApiResult<Json<estimates::Model>> {
    validate(&payload)?;
    let estimate = repo(&state)
        .update(auth.contractor_id(), id, payload.into())
        .await?;
    Ok(Json(estimate))
}

/// DELETE /estimates/{id}
async fn delete_estimate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&state).delete(auth.contractor_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /estimates/{id}/entries
async fn list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<estimate_entries::Model>>> {
    let entries = entry_repo(&state)
        .list_estimate_entries(auth.contractor_id(), id)
        .await?;
    Ok(Json(entries))
}

/// POST /estimates/{id}/entries
async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EntryRequest>,
) -> ApiResult<(StatusCode, Json<estimate_entries::Model>)> {
    let entry = entry_repo(&state)
        .create_estimate_entry(auth.contractor_id(), id, payload.into_input()?)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /estimate-entries/{id}
async fn update_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EntryRequest>,
) -> ApiResult<Json<estimate_entries::Model>> {
    let entry = entry_repo(&state)
        .update_estimate_entry(auth.contractor_id(), id, payload.into_input()?)
        .await?;
    Ok(Json(entry))
}

/// DELETE /estimate-entries/{id}
async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    entry_repo(&state)
        .delete_estimate_entry(auth.contractor_id(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /estimates/{id}/duplicate - Copies into a new draft at current rates.
async fn duplicate_estimate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<estimates::Model>)> {
    let copy = repo(&state).duplicate(auth.contractor_id(), id).await?;
    info!(source_id = %id, estimate_id = %copy.id, "Estimate duplicated");
    Ok((StatusCode::CREATED, Json(copy)))
}

/// POST /estimates/{id}/email - Sends the customer report and marks it sent.
///
/// The status only changes once the mail server accepted the message.
async fn email_estimate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EmailResponse>> {
    let contractor_id = auth.contractor_id();
    let estimates = repo(&state);

    let estimate = estimates.find(contractor_id, id).await?;
    let contractor = ContractorRepository::new((*state.db).clone())
        .find_by_id(contractor_id)
        .await?;
    let report = ReportRepository::new((*state.db).clone())
        .estimate_customer_report(contractor_id, id)
        .await?;

    let email = EstimateService::render_email(
        &report,
        &estimate.customer_email,
        &estimate.notes,
        &contractor.name,
        &state.reports.currency_symbol,
    )?;

    if let Err(e) = state
        .email_service
        .send_email(&email.to, &email.subject, &email.body)
        .await
    {
        warn!(estimate_id = %id, error = %e, "Estimate email failed");
        return Err(e.into());
    }

    let estimate = estimates.mark_sent(contractor_id, id).await?;
    info!(estimate_id = %id, to = %email.to, "Estimate emailed");

    Ok(Json(EmailResponse {
        sent_to: email.to,
        estimate,
    }))
}

/// POST /estimates/{id}/accept?start_date= - Turns the estimate into a project.
async fn accept_estimate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<AcceptQuery>,
) -> ApiResult<(StatusCode, Json<AcceptResponse>)> {
    let start_date = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let (estimate, project) = repo(&state)
        .accept(auth.contractor_id(), id, start_date)
        .await?;
    Ok((StatusCode::CREATED, Json(AcceptResponse { estimate, project })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_request_trims_customer_fields() {
        let request = EstimateRequest {
            name: "Driveway".to_string(),
            customer_name: " Ann Lee ".to_string(),
            customer_email: Some(" ann@example.com ".to_string()),
            notes: String::new(),
        };

        let input: EstimateInput = request.into();

        assert_eq!(input.customer_name, "Ann Lee");
        assert_eq!(input.customer_email, "ann@example.com");
    }

    #[test]
    fn test_bad_customer_email_fails_validation() {
        let request = EstimateRequest {
            name: "Driveway".to_string(),
            customer_name: String::new(),
            customer_email: Some("not-an-email".to_string()),
            notes: String::new(),
        };

        assert!(validate(&request).is_err());
    }

    #[test]
    fn test_totals_count_missing_amounts_as_zero() {
        let now = Utc::now().into();
        let entry = |cost, billable| estimate_entries::Model {
            id: Uuid::new_v4(),
            estimate_id: Uuid::nil(),
            hours: dec!(1),
            asset_id: None,
            employee_id: None,
            material_id: None,
            material_description: None,
            material_unit: None,
            material_cost: None,
            service_markup: None,
            description: String::new(),
            cost_amount: cost,
            billable_amount: billable,
            created_at: now,
            updated_at: now,
        };

        let totals = totals(&[entry(Some(dec!(40)), Some(dec!(50))), entry(None, None)]);

        assert_eq!(totals.total_cost, dec!(40));
        assert_eq!(totals.total_billable, dec!(50));
        assert_eq!(totals.skipped, 1);
    }
}
