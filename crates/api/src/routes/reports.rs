//! Report routes. Every report is JSON by default and a PDF with `?export=pdf`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderName, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    export::{Document, render_pdf},
    middleware::AuthUser,
};
use jobledger_db::{ContractorRepository, ReportRepository};

/// Header set when a PDF was asked for but JSON is returned instead.
pub const EXPORT_FALLBACK_HEADER: &str = "x-export-fallback";

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/contractor", get(contractor_report))
        .route("/projects/{id}/customer-report", get(project_customer_report))
        .route("/projects/{id}/contractor-report", get(project_contractor_report))
        .route("/estimates/{id}/customer-report", get(estimate_customer_report))
        .route("/estimates/{id}/internal-report", get(estimate_internal_report))
        .route("/estimates/{id}/report", get(estimate_vs_actual))
}

/// Output format selector.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// `pdf` for a PDF download; anything else is JSON.
    pub export: Option<String>,
}

impl ExportQuery {
    fn wants_pdf(&self) -> bool {
        self.export
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("pdf"))
    }
}

/// Answers with JSON or, when asked and possible, a rendered PDF.
///
/// Rendering runs on the blocking pool. If PDF output is disabled or
/// rendering fails the JSON body is returned with [`EXPORT_FALLBACK_HEADER`].
async fn respond<T, F>(state: &AppState, query: &ExportQuery, report: T, filename: &str, build: F) -> Response
where
    T: Serialize,
    F: FnOnce(&T, &str) -> Document,
{
    if !query.wants_pdf() {
        return Json(report).into_response();
    }
    if !state.reports.pdf_enabled {
        return fallback(report);
    }

    let document = build(&report, &state.reports.currency_symbol);
    match tokio::task::spawn_blocking(move || render_pdf(&document)).await {
        Ok(Ok(bytes)) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}.pdf\"", file_stem(filename)),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(e)) => {
            warn!(error = %e, report = filename, "PDF rendering failed, answering with JSON");
            fallback(report)
        }
        Err(e) => {
            warn!(error = %e, report = filename, "PDF task failed, answering with JSON");
            fallback(report)
        }
    }
}

fn fallback<T: Serialize>(report: T) -> Response {
    (
        [(HeaderName::from_static(EXPORT_FALLBACK_HEADER), "pdf-unavailable")],
        Json(report),
    )
        .into_response()
}

/// File name safe for a Content-Disposition header.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "report".to_string()
    } else {
        stem.to_string()
    }
}

fn repo(state: &AppState) -> ReportRepository {
    ReportRepository::new((*state.db).clone())
}

/// GET /reports/contractor - Profit across every project.
async fn contractor_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let contractor_id = auth.contractor_id();
    let report = repo(&state).contractor_report(contractor_id).await?;
    let contractor = ContractorRepository::new((*state.db).clone())
        .find_by_id(contractor_id)
        .await?;

    Ok(respond(&state, &query, report, "contractor-report", |r, symbol| {
        Document::contractor_report(r, &contractor.name, symbol)
    })
    .await)
}

/// GET /projects/{id}/customer-report
async fn project_customer_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let report = repo(&state)
        .project_customer_report(auth.contractor_id(), id)
        .await?;
    let filename = format!("customer-report-{}", report.subject.name);
    Ok(respond(&state, &query, report, &filename, Document::customer_report).await)
}

/// GET /projects/{id}/contractor-report - Job cost report with profit.
async fn project_contractor_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let report = repo(&state)
        .project_job_cost_report(auth.contractor_id(), id)
        .await?;
    let filename = format!("job-cost-{}", report.subject.name);
    Ok(respond(&state, &query, report, &filename, Document::job_cost_report).await)
}

/// GET /estimates/{id}/customer-report
async fn estimate_customer_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let report = repo(&state)
        .estimate_customer_report(auth.contractor_id(), id)
        .await?;
    let filename = format!("estimate-{}", report.subject.name);
    Ok(respond(&state, &query, report, &filename, Document::customer_report).await)
}

/// GET /estimates/{id}/internal-report
async fn estimate_internal_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let report = repo(&state)
        .estimate_internal_report(auth.contractor_id(), id)
        .await?;
    let filename = format!("estimate-internal-{}", report.subject.name);
    Ok(respond(&state, &query, report, &filename, Document::job_cost_report).await)
}

/// GET /estimates/{id}/report - Estimate against the linked project's actuals.
async fn estimate_vs_actual(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let report = repo(&state)
        .estimate_vs_actual(auth.contractor_id(), id)
        .await?;
    let filename = format!("estimate-vs-actual-{}", report.estimate.name);
    Ok(respond(&state, &query, report, &filename, Document::estimate_vs_actual).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::state;
    use axum::http::StatusCode;
    use jobledger_core::reports::{ReportSubject, Totals};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn report() -> jobledger_core::reports::EstimateVsActual {
        jobledger_core::reports::EstimateVsActual {
            estimate: ReportSubject {
                id: Uuid::nil(),
                name: "Patio".to_string(),
                start_date: None,
                end_date: None,
                customer_name: Some("Ann".to_string()),
            },
            estimated: Totals::default(),
            project: None,
            actual: None,
            billable: None,
            cost: None,
        }
    }

    fn query(export: Option<&str>) -> ExportQuery {
        ExportQuery {
            export: export.map(str::to_string),
        }
    }

    #[test]
    fn test_file_stem_is_header_safe() {
        assert_eq!(file_stem("estimate-Back Yard \"Deck\""), "estimate-back-yard--deck");
        assert_eq!(file_stem("***"), "report");
    }

    #[test]
    fn test_wants_pdf() {
        assert!(query(Some("PDF")).wants_pdf());
        assert!(!query(Some("csv")).wants_pdf());
        assert!(!query(None).wants_pdf());
    }

    #[tokio::test]
    async fn test_json_by_default() {
        let state = state(MockDatabase::new(DatabaseBackend::Postgres).into_connection(), vec![]);

        let response = respond(&state, &query(None), report(), "r", Document::estimate_vs_actual).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(EXPORT_FALLBACK_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_pdf_export() {
        let state = state(MockDatabase::new(DatabaseBackend::Postgres).into_connection(), vec![]);

        let response = respond(&state, &query(Some("pdf")), report(), "Patio", Document::estimate_vs_actual).await;

        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"patio.pdf\""
        );
    }

    #[tokio::test]
    async fn test_disabled_pdf_falls_back_to_json() {
        let mut state = state(MockDatabase::new(DatabaseBackend::Postgres).into_connection(), vec![]);
        state.reports = std::sync::Arc::new(jobledger_shared::ReportConfig {
            currency_symbol: "$".to_string(),
            pdf_enabled: false,
        });

        let response = respond(&state, &query(Some("pdf")), report(), "r", Document::estimate_vs_actual).await;

        assert_eq!(response.headers()[EXPORT_FALLBACK_HEADER], "pdf-unavailable");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }
}
