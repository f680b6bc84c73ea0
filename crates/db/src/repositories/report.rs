//! Report repository: loads entries and payments and hands them to
//! [`ReportService`] for aggregation.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use jobledger_core::billing::{BillingError, Margin, MaterialUsage, Rates, UsageInput};
use jobledger_core::reports::{
    ContractorReport, ContractorSummary, CustomerReport, DateRange, DatedUsage, EntryAmounts,
    EstimateVsActual, JobCostReport, PaymentLine, ProjectAnalytics, ProjectRollup, ReportError,
    ReportLine, ReportService, ReportSubject, Totals,
};
use jobledger_shared::AppError;

use crate::entities::{
    assets, contractors, employees, estimate_entries, estimates, job_entries, payments, projects,
};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportRepoError {
    /// Contractor not found.
    #[error("Contractor not found: {0}")]
    ContractorNotFound(Uuid),

    /// Project not found for this contractor.
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    /// Estimate not found for this contractor.
    #[error("Estimate not found: {0}")]
    EstimateNotFound(Uuid),

    /// Invalid report parameters.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Stored rates or margin are out of range.
    #[error(transparent)]
    Billing(#[from] BillingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReportRepoError> for AppError {
    fn from(err: ReportRepoError) -> Self {
        match err {
            ReportRepoError::Report(e) => e.into(),
            ReportRepoError::Billing(e) => Self::Internal(e.to_string()),
            ReportRepoError::Database(e) => Self::Database(e.to_string()),
            not_found => Self::NotFound(not_found.to_string()),
        }
    }
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Contractor-wide
    // ========================================================================

    /// Dashboard: billed, paid and outstanding per project.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn contractor_summary(&self, contractor_id: Uuid) -> Result<ContractorSummary, ReportRepoError> {
        let rollups = self.project_rollups(contractor_id).await?;
        Ok(ReportService::contractor_summary(&rollups))
    }

    /// Profitability across all of the contractor's projects.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn contractor_report(&self, contractor_id: Uuid) -> Result<ContractorReport, ReportRepoError> {
        let rollups = self.project_rollups(contractor_id).await?;
        Ok(ReportService::contractor_report(&rollups))
    }

    /// Per-project sums of entry amounts and payments, newest project first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn project_rollups(&self, contractor_id: Uuid) -> Result<Vec<ProjectRollup>, ReportRepoError> {
        let projects = projects::Entity::find()
            .filter(projects::Column::ContractorId.eq(contractor_id))
            .order_by_desc(projects::Column::StartDate)
            .order_by_asc(projects::Column::Name)
            .all(&self.db)
            .await?;

        if projects.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let entries = job_entries::Entity::find()
            .filter(job_entries::Column::ProjectId.is_in(ids.clone()))
            .all(&self.db)
            .await?;
        let payments = payments::Entity::find()
            .filter(payments::Column::ProjectId.is_in(ids))
            .all(&self.db)
            .await?;

        let mut rollups: Vec<ProjectRollup> = projects
            .into_iter()
            .map(|p| ProjectRollup {
                project_id: p.id,
                name: p.name,
                start_date: p.start_date,
                end_date: p.end_date,
                total_cost: None,
                total_billable: None,
                total_payments: None,
                entry_count: 0,
            })
            .collect();
        let index: HashMap<Uuid, usize> = rollups
            .iter()
            .enumerate()
            .map(|(i, r)| (r.project_id, i))
            .collect();

        for entry in entries {
            if let Some(&i) = index.get(&entry.project_id) {
                let rollup = &mut rollups[i];
                rollup.entry_count += 1;
                if let Some(cost) = entry.cost_amount {
                    *rollup.total_cost.get_or_insert_default() += cost;
                }
                if let Some(billable) = entry.billable_amount {
                    *rollup.total_billable.get_or_insert_default() += billable;
                }
            }
        }
        for payment in payments {
            if let Some(&i) = index.get(&payment.project_id) {
                *rollups[i].total_payments.get_or_insert_default() += payment.amount;
            }
        }

        Ok(rollups)
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Customer-facing report for a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not the contractor's or a query fails.
    pub async fn project_customer_report(
        &self,
        contractor_id: Uuid,
        project_id: Uuid,
    ) -> Result<CustomerReport, ReportRepoError> {
        let project = self.project(contractor_id, project_id).await?;
        let lines = self.project_lines(contractor_id, project_id).await?;
        let payments = self.payment_lines(project_id).await?;
        Ok(ReportService::customer_report(
            project_subject(&project),
            &lines,
            payments,
        ))
    }

    /// Internal job cost report for a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not the contractor's or a query fails.
    pub async fn project_job_cost_report(
        &self,
        contractor_id: Uuid,
        project_id: Uuid,
    ) -> Result<JobCostReport, ReportRepoError> {
        let project = self.project(contractor_id, project_id).await?;
        let lines = self.project_lines(contractor_id, project_id).await?;
        let payments = self.payment_lines(project_id).await?;
        let report = ReportService::job_cost_report(project_subject(&project), &lines, payments);
        if report.totals.skipped > 0 {
            tracing::warn!(
                project_id = %project_id,
                skipped = report.totals.skipped,
                "Entries with missing amounts counted as zero"
            );
        }
        Ok(report)
    }

    /// Project analytics recomputed from the catalog's current rates.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not the contractor's, the range is
    /// inverted, stored values are out of range, or a query fails.
    pub async fn project_analytics(
        &self,
        contractor_id: Uuid,
        project_id: Uuid,
        range: DateRange,
    ) -> Result<ProjectAnalytics, ReportRepoError> {
        self.project(contractor_id, project_id).await?;
        let margin = self.margin(contractor_id).await?;
        let usages = self.project_usages(contractor_id, project_id).await?;
        Ok(ReportService::project_analytics(&usages, margin, range)?)
    }

    /// A project's entries as pricing inputs, using current catalog rates.
    ///
    /// Entries whose asset or employee has since been deleted are priced
    /// without that rate source. Rows holding values the calculator rejects
    /// are logged and left out rather than failing the whole report.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn project_usages(
        &self,
        contractor_id: Uuid,
        project_id: Uuid,
    ) -> Result<Vec<DatedUsage>, ReportRepoError> {
        let entries = job_entries::Entity::find()
            .filter(job_entries::Column::ProjectId.eq(project_id))
            .order_by_asc(job_entries::Column::Date)
            .all(&self.db)
            .await?;

        let asset_rates: HashMap<Uuid, Rates> = assets::Entity::find()
            .filter(assets::Column::ContractorId.eq(contractor_id))
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|a| match Rates::new(a.cost_rate, a.billable_rate) {
                Ok(rates) => Some((a.id, rates)),
                Err(e) => {
                    tracing::warn!(asset_id = %a.id, error = %e, "Ignoring asset with invalid rates");
                    None
                }
            })
            .collect();
        let employee_rates: HashMap<Uuid, Rates> = employees::Entity::find()
            .filter(employees::Column::ContractorId.eq(contractor_id))
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|e| match Rates::new(e.cost_rate, e.billable_rate) {
                Ok(rates) => Some((e.id, rates)),
                Err(err) => {
                    tracing::warn!(employee_id = %e.id, error = %err, "Ignoring employee with invalid rates");
                    None
                }
            })
            .collect();

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let entry_id = entry.id;
                match usage_input(entry, &asset_rates, &employee_rates) {
                    Ok(usage) => Some(usage),
                    Err(e) => {
                        tracing::warn!(
                            project_id = %project_id,
                            entry_id = %entry_id,
                            error = %e,
                            "Skipping entry with invalid stored values"
                        );
                        None
                    }
                }
            })
            .collect())
    }

    // ========================================================================
    // Estimates
    // ========================================================================

    /// Customer view of an estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is not the contractor's or a query fails.
    pub async fn estimate_customer_report(
        &self,
        contractor_id: Uuid,
        estimate_id: Uuid,
    ) -> Result<CustomerReport, ReportRepoError> {
        let estimate = self.estimate(contractor_id, estimate_id).await?;
        let lines = self.estimate_lines(contractor_id, estimate_id).await?;
        Ok(ReportService::estimate_customer_report(
            estimate_subject(&estimate),
            &lines,
        ))
    }

    /// Internal view of an estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is not the contractor's or a query fails.
    pub async fn estimate_internal_report(
        &self,
        contractor_id: Uuid,
        estimate_id: Uuid,
    ) -> Result<JobCostReport, ReportRepoError> {
        let estimate = self.estimate(contractor_id, estimate_id).await?;
        let lines = self.estimate_lines(contractor_id, estimate_id).await?;
        Ok(ReportService::estimate_internal_report(
            estimate_subject(&estimate),
            &lines,
        ))
    }

    /// Estimate totals against the project created from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is not the contractor's or a query fails.
    pub async fn estimate_vs_actual(
        &self,
        contractor_id: Uuid,
        estimate_id: Uuid,
    ) -> Result<EstimateVsActual, ReportRepoError> {
        let estimate = self.estimate(contractor_id, estimate_id).await?;
        let estimated = self.estimate_totals(estimate_id).await?;

        let project = projects::Entity::find()
            .filter(projects::Column::ContractorId.eq(contractor_id))
            .filter(projects::Column::EstimateId.eq(estimate_id))
            .one(&self.db)
            .await?;

        let actual = match project {
            Some(project) => {
                let totals = self.project_totals(project.id).await?;
                Some((project_subject(&project), totals))
            }
            None => None,
        };

        Ok(ReportService::estimate_vs_actual(
            estimate_subject(&estimate),
            estimated,
            actual,
        ))
    }

    // ========================================================================
    // Loaders
    // ========================================================================

    async fn project(&self, contractor_id: Uuid, id: Uuid) -> Result<projects::Model, ReportRepoError> {
        projects::Entity::find_by_id(id)
            .filter(projects::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(ReportRepoError::ProjectNotFound(id))
    }

    async fn estimate(&self, contractor_id: Uuid, id: Uuid) -> Result<estimates::Model, ReportRepoError> {
        estimates::Entity::find_by_id(id)
            .filter(estimates::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(ReportRepoError::EstimateNotFound(id))
    }

    async fn margin(&self, contractor_id: Uuid) -> Result<Margin, ReportRepoError> {
        let contractor = contractors::Entity::find_by_id(contractor_id)
            .one(&self.db)
            .await?
            .ok_or(ReportRepoError::ContractorNotFound(contractor_id))?;
        Ok(Margin::new(contractor.material_margin)?)
    }

    async fn project_lines(&self, contractor_id: Uuid, project_id: Uuid) -> Result<Vec<ReportLine>, ReportRepoError> {
        let entries = job_entries::Entity::find()
            .filter(job_entries::Column::ProjectId.eq(project_id))
            .order_by_asc(job_entries::Column::Date)
            .order_by_asc(job_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let names = self.rate_source_names(contractor_id).await?;

        Ok(entries
            .into_iter()
            .map(|e| ReportLine {
                entry_id: e.id,
                date: Some(e.date),
                asset_name: names.asset(e.asset_id),
                employee_name: names.employee(e.employee_id),
                description: e.description,
                material_description: e.material_description,
                material_unit: e.material_unit,
                hours: e.hours,
                amounts: EntryAmounts {
                    cost_amount: e.cost_amount,
                    billable_amount: e.billable_amount,
                },
            })
            .collect())
    }

    async fn estimate_lines(&self, contractor_id: Uuid, estimate_id: Uuid) -> Result<Vec<ReportLine>, ReportRepoError> {
        let entries = estimate_entries::Entity::find()
            .filter(estimate_entries::Column::EstimateId.eq(estimate_id))
            .order_by_asc(estimate_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let names = self.rate_source_names(contractor_id).await?;

        Ok(entries
            .into_iter()
            .map(|e| ReportLine {
                entry_id: e.id,
                date: None,
                asset_name: names.asset(e.asset_id),
                employee_name: names.employee(e.employee_id),
                description: e.description,
                material_description: e.material_description,
                material_unit: e.material_unit,
                hours: e.hours,
                amounts: EntryAmounts {
                    cost_amount: e.cost_amount,
                    billable_amount: e.billable_amount,
                },
            })
            .collect())
    }

    async fn payment_lines(&self, project_id: Uuid) -> Result<Vec<PaymentLine>, ReportRepoError> {
        Ok(payments::Entity::find()
            .filter(payments::Column::ProjectId.eq(project_id))
            .order_by_asc(payments::Column::Date)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| PaymentLine {
                date: p.date,
                amount: p.amount,
                notes: p.notes,
            })
            .collect())
    }

    async fn project_totals(&self, project_id: Uuid) -> Result<Totals, ReportRepoError> {
        let amounts: Vec<EntryAmounts> = job_entries::Entity::find()
            .filter(job_entries::Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| EntryAmounts {
                cost_amount: e.cost_amount,
                billable_amount: e.billable_amount,
            })
            .collect();
        Ok(ReportService::totals(&amounts))
    }

    async fn estimate_totals(&self, estimate_id: Uuid) -> Result<Totals, ReportRepoError> {
        let amounts: Vec<EntryAmounts> = estimate_entries::Entity::find()
            .filter(estimate_entries::Column::EstimateId.eq(estimate_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| EntryAmounts {
                cost_amount: e.cost_amount,
                billable_amount: e.billable_amount,
            })
            .collect();
        Ok(ReportService::totals(&amounts))
    }

    async fn rate_source_names(&self, contractor_id: Uuid) -> Result<RateSourceNames, ReportRepoError> {
        let assets = assets::Entity::find()
            .filter(assets::Column::ContractorId.eq(contractor_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect();
        let employees = employees::Entity::find()
            .filter(employees::Column::ContractorId.eq(contractor_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| (e.id, e.name))
            .collect();
        Ok(RateSourceNames { assets, employees })
    }
}

struct RateSourceNames {
    assets: HashMap<Uuid, String>,
    employees: HashMap<Uuid, String>,
}

impl RateSourceNames {
    fn asset(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.assets.get(&id)).cloned()
    }

    fn employee(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.employees.get(&id)).cloned()
    }
}

fn usage_input(
    entry: job_entries::Model,
    asset_rates: &HashMap<Uuid, Rates>,
    employee_rates: &HashMap<Uuid, Rates>,
) -> Result<DatedUsage, BillingError> {
    let mut input = UsageInput::new(entry.hours)?;
    if let Some(rates) = entry.asset_id.and_then(|id| asset_rates.get(&id)) {
        input = input.with_asset(*rates);
    }
    if let Some(rates) = entry.employee_id.and_then(|id| employee_rates.get(&id)) {
        input = input.with_employee(*rates);
    }
    if let Some(cost) = entry.material_cost {
        input = input.with_material(MaterialUsage::new(cost, entry.service_markup)?);
    }
    Ok(DatedUsage {
        date: entry.date,
        input,
    })
}

fn project_subject(project: &projects::Model) -> ReportSubject {
    ReportSubject {
        id: project.id,
        name: project.name.clone(),
        start_date: Some(project.start_date),
        end_date: project.end_date,
        customer_name: None,
    }
}

fn estimate_subject(estimate: &estimates::Model) -> ReportSubject {
    ReportSubject {
        id: estimate.id,
        name: estimate.name.clone(),
        start_date: None,
        end_date: None,
        customer_name: Some(estimate.customer_name.clone()),
    }
}
