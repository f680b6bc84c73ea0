//! Usage entry repository: pricing, job entries, estimate entries and search.
//!
//! Entries never carry client-supplied amounts. Every create or update
//! resolves the referenced rate sources for the owning contractor, runs the
//! billing calculator and stores the result.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Condition, Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set,
};
use serde::Serialize;
use uuid::Uuid;

use jobledger_core::billing::{
    BillingError, BillingService, MAX_AMOUNT, Margin, MaterialUsage, Rates, UsageAmounts,
    UsageInput,
};
use jobledger_core::estimate::{EstimateError, EstimateService};
use jobledger_shared::AppError;
use jobledger_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    assets, contractors, employees, estimate_entries, estimates, job_entries, materials, projects,
};

/// Error types for entry operations.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// Contractor not found.
    #[error("Contractor not found: {0}")]
    ContractorNotFound(Uuid),

    /// Project not found for this contractor.
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    /// Estimate not found for this contractor.
    #[error("Estimate not found: {0}")]
    EstimateNotFound(Uuid),

    /// Entry not found for this contractor.
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Asset not found for this contractor.
    #[error("Asset not found: {0}")]
    AssetNotFound(Uuid),

    /// Employee not found for this contractor.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(Uuid),

    /// Material template not found for this contractor.
    #[error("Material not found: {0}")]
    MaterialNotFound(Uuid),

    /// Invalid pricing input.
    #[error(transparent)]
    Billing(#[from] BillingError),

    /// Estimate rule violation.
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<EntryError> for AppError {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::Billing(e) => e.into(),
            EntryError::Estimate(e) => e.into(),
            EntryError::Database(e) => Self::Database(e.to_string()),
            not_found => Self::NotFound(not_found.to_string()),
        }
    }
}

/// What a client submits for a usage entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryInput {
    /// Hours worked or quantity of material.
    pub hours: Decimal,
    /// Asset used.
    pub asset_id: Option<Uuid>,
    /// Employee who worked.
    pub employee_id: Option<Uuid>,
    /// Material template; fills material fields that were left empty.
    pub material_id: Option<Uuid>,
    /// Material description.
    pub material_description: Option<String>,
    /// Material unit.
    pub material_unit: Option<String>,
    /// Material cost per unit.
    pub material_cost: Option<Decimal>,
    /// Per-entry markup percentage.
    pub service_markup: Option<Decimal>,
    /// Free-text description.
    pub description: String,
}

impl EntryInput {
    pub(crate) fn from_estimate_entry(entry: &estimate_entries::Model) -> Self {
        Self {
            hours: entry.hours,
            asset_id: entry.asset_id,
            employee_id: entry.employee_id,
            material_id: entry.material_id,
            material_description: entry.material_description.clone(),
            material_unit: entry.material_unit.clone(),
            material_cost: entry.material_cost,
            service_markup: entry.service_markup,
            description: entry.description.clone(),
        }
    }
}

/// An entry input with material defaults applied and amounts computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedEntry {
    /// Resolved input.
    pub input: EntryInput,
    /// Calculator output.
    pub amounts: UsageAmounts,
}

/// A job entry found by search.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct EntrySearchHit {
    /// Entry ID.
    pub id: Uuid,
    /// Project ID.
    pub project_id: Uuid,
    /// Project name.
    pub project_name: String,
    /// Work date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Material description.
    pub material_description: Option<String>,
    /// Hours or quantity.
    pub hours: Decimal,
    /// Billable amount.
    pub billable_amount: Option<Decimal>,
}

/// Loads a contractor's material margin.
///
/// # Errors
///
/// Returns an error if the contractor does not exist or the stored margin is out of range.
pub async fn contractor_margin<C>(conn: &C, contractor_id: Uuid) -> Result<Margin, EntryError>
where
    C: ConnectionTrait,
{
    let contractor = contractors::Entity::find_by_id(contractor_id)
        .one(conn)
        .await?
        .ok_or(EntryError::ContractorNotFound(contractor_id))?;
    Ok(Margin::new(contractor.material_margin)?)
}

/// Resolves rate sources for `contractor_id` and prices the entry.
///
/// # Errors
///
/// Returns an error if a referenced asset, employee or material belongs to
/// another contractor or does not exist, or if any input is negative.
pub async fn price_entry<C>(
    conn: &C,
    contractor_id: Uuid,
    mut input: EntryInput,
    margin: Margin,
) -> Result<PricedEntry, EntryError>
where
    C: ConnectionTrait,
{
    let mut usage = UsageInput::new(input.hours)?;

    if let Some(id) = input.asset_id {
        let asset = assets::Entity::find_by_id(id)
            .filter(assets::Column::ContractorId.eq(contractor_id))
            .one(conn)
            .await?
            .ok_or(EntryError::AssetNotFound(id))?;
        usage = usage.with_asset(Rates::new(asset.cost_rate, asset.billable_rate)?);
    }

    if let Some(id) = input.employee_id {
        let employee = employees::Entity::find_by_id(id)
            .filter(employees::Column::ContractorId.eq(contractor_id))
            .one(conn)
            .await?
            .ok_or(EntryError::EmployeeNotFound(id))?;
        usage = usage.with_employee(Rates::new(employee.cost_rate, employee.billable_rate)?);
    }

    if let Some(id) = input.material_id {
        let material = materials::Entity::find_by_id(id)
            .filter(materials::Column::ContractorId.eq(contractor_id))
            .one(conn)
            .await?
            .ok_or(EntryError::MaterialNotFound(id))?;
        apply_material_template(&mut input, material);
    }

    if let Some(cost) = input.material_cost {
        usage = usage.with_material(MaterialUsage::new(cost, input.service_markup)?);
    }

    let amounts = BillingService::compute(&usage, margin);
    for (field, value) in [
        ("cost_amount", amounts.cost_amount),
        ("billable_amount", amounts.billable_amount),
    ] {
        if value > MAX_AMOUNT {
            return Err(BillingError::TooLarge {
                field,
                value,
                max: MAX_AMOUNT,
            }
            .into());
        }
    }
    Ok(PricedEntry { input, amounts })
}

/// Fills material fields the client left empty from the catalog template.
fn apply_material_template(input: &mut EntryInput, material: materials::Model) {
    if input
        .material_description
        .as_deref()
        .is_none_or(|d| d.trim().is_empty())
    {
        input.material_description = Some(material.description);
    }
    if input.material_unit.as_deref().is_none_or(|u| u.trim().is_empty()) {
        input.material_unit = Some(material.unit);
    }
    if input.material_cost.is_none() {
        input.material_cost = Some(material.actual_cost);
    }
    if input.service_markup.is_none() {
        input.service_markup = material.service_markup;
    }
}

/// Builds a new estimate entry row from a priced input.
pub(crate) fn new_estimate_entry(estimate_id: Uuid, priced: PricedEntry) -> estimate_entries::ActiveModel {
    let now = Utc::now().into();
    let PricedEntry { input, amounts } = priced;
    estimate_entries::ActiveModel {
        id: Set(Uuid::new_v4()),
        estimate_id: Set(estimate_id),
        hours: Set(input.hours),
        asset_id: Set(input.asset_id),
        employee_id: Set(input.employee_id),
        material_id: Set(input.material_id),
        material_description: Set(input.material_description),
        material_unit: Set(input.material_unit),
        material_cost: Set(input.material_cost),
        service_markup: Set(input.service_markup),
        description: Set(input.description),
        cost_amount: Set(Some(amounts.cost_amount)),
        billable_amount: Set(Some(amounts.billable_amount)),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Usage entry repository.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    db: DatabaseConnection,
}

impl EntryRepository {
    /// Creates a new entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Job entries
    // ========================================================================

    /// Lists a project's entries in date order.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not the contractor's or the query fails.
    pub async fn list_job_entries(
        &self,
        contractor_id: Uuid,
        project_id: Uuid,
    ) -> Result<Vec<job_entries::Model>, EntryError> {
        self.owned_project(contractor_id, project_id).await?;
        Ok(job_entries::Entity::find()
            .filter(job_entries::Column::ProjectId.eq(project_id))
            .order_by_asc(job_entries::Column::Date)
            .order_by_asc(job_entries::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Prices and stores a new job entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the project or a referenced rate source is not the
    /// contractor's, if the input is invalid, or if the insert fails.
    pub async fn create_job_entry(
        &self,
        contractor_id: Uuid,
        project_id: Uuid,
        date: NaiveDate,
        input: EntryInput,
    ) -> Result<job_entries::Model, EntryError> {
        self.owned_project(contractor_id, project_id).await?;
        let margin = contractor_margin(&self.db, contractor_id).await?;
        let PricedEntry { input, amounts } =
            price_entry(&self.db, contractor_id, input, margin).await?;

        let now = Utc::now().into();
        let entry = job_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            date: Set(date),
            hours: Set(input.hours),
            asset_id: Set(input.asset_id),
            employee_id: Set(input.employee_id),
            material_id: Set(input.material_id),
            material_description: Set(input.material_description),
            material_unit: Set(input.material_unit),
            material_cost: Set(input.material_cost),
            service_markup: Set(input.service_markup),
            description: Set(input.description),
            cost_amount: Set(Some(amounts.cost_amount)),
            billable_amount: Set(Some(amounts.billable_amount)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let entry = entry.insert(&self.db).await?;
        tracing::debug!(
            entry_id = %entry.id,
            project_id = %project_id,
            billable = %amounts.billable_amount,
            "Job entry priced"
        );
        Ok(entry)
    }

    /// Replaces a job entry's inputs and recomputes its amounts in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not the contractor's, if the input is
    /// invalid, or if the update fails.
    pub async fn update_job_entry(
        &self,
        contractor_id: Uuid,
        entry_id: Uuid,
        date: NaiveDate,
        input: EntryInput,
    ) -> Result<job_entries::Model, EntryError> {
        let existing = self.owned_job_entry(contractor_id, entry_id).await?;
        let margin = contractor_margin(&self.db, contractor_id).await?;
        let PricedEntry { input, amounts } =
            price_entry(&self.db, contractor_id, input, margin).await?;

        let mut entry: job_entries::ActiveModel = existing.into();
        entry.date = Set(date);
        entry.hours = Set(input.hours);
        entry.asset_id = Set(input.asset_id);
        entry.employee_id = Set(input.employee_id);
        entry.material_id = Set(input.material_id);
        entry.material_description = Set(input.material_description);
        entry.material_unit = Set(input.material_unit);
        entry.material_cost = Set(input.material_cost);
        entry.service_markup = Set(input.service_markup);
        entry.description = Set(input.description);
        entry.cost_amount = Set(Some(amounts.cost_amount));
        entry.billable_amount = Set(Some(amounts.billable_amount));
        entry.updated_at = Set(Utc::now().into());

        Ok(entry.update(&self.db).await?)
    }

    /// Deletes a job entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not the contractor's or the delete fails.
    pub async fn delete_job_entry(&self, contractor_id: Uuid, entry_id: Uuid) -> Result<(), EntryError> {
        let entry = self.owned_job_entry(contractor_id, entry_id).await?;
        entry.delete(&self.db).await?;
        Ok(())
    }

    // ========================================================================
    // Estimate entries
    // ========================================================================

    /// Lists an estimate's entries in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is not the contractor's or the query fails.
    pub async fn list_estimate_entries(
        &self,
        contractor_id: Uuid,
        estimate_id: Uuid,
    ) -> Result<Vec<estimate_entries::Model>, EntryError> {
        self.owned_estimate(contractor_id, estimate_id).await?;
        Ok(estimate_entries::Entity::find()
            .filter(estimate_entries::Column::EstimateId.eq(estimate_id))
            .order_by_asc(estimate_entries::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Prices and stores a new estimate entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is accepted or not the contractor's,
    /// if the input is invalid, or if the insert fails.
    pub async fn create_estimate_entry(
        &self,
        contractor_id: Uuid,
        estimate_id: Uuid,
        input: EntryInput,
    ) -> Result<estimate_entries::Model, EntryError> {
        let estimate = self.owned_estimate(contractor_id, estimate_id).await?;
        EstimateService::ensure_editable(estimate.status.into())?;

        let margin = contractor_margin(&self.db, contractor_id).await?;
        let priced = price_entry(&self.db, contractor_id, input, margin).await?;

        Ok(new_estimate_entry(estimate_id, priced)
            .insert(&self.db)
            .await?)
    }

    /// Replaces an estimate entry's inputs and recomputes its amounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is accepted, the entry is not the
    /// contractor's, the input is invalid, or the update fails.
    pub async fn update_estimate_entry(
        &self,
        contractor_id: Uuid,
        entry_id: Uuid,
        input: EntryInput,
    ) -> Result<estimate_entries::Model, EntryError> {
        let (existing, estimate) = self.owned_estimate_entry(contractor_id, entry_id).await?;
        EstimateService::ensure_editable(estimate.status.into())?;

        let margin = contractor_margin(&self.db, contractor_id).await?;
        let PricedEntry { input, amounts } =
            price_entry(&self.db, contractor_id, input, margin).await?;

        let mut entry: estimate_entries::ActiveModel = existing.into();
        entry.hours = Set(input.hours);
        entry.asset_id = Set(input.asset_id);
        entry.employee_id = Set(input.employee_id);
        entry.material_id = Set(input.material_id);
        entry.material_description = Set(input.material_description);
        entry.material_unit = Set(input.material_unit);
        entry.material_cost = Set(input.material_cost);
        entry.service_markup = Set(input.service_markup);
        entry.description = Set(input.description);
        entry.cost_amount = Set(Some(amounts.cost_amount));
        entry.billable_amount = Set(Some(amounts.billable_amount));
        entry.updated_at = Set(Utc::now().into());

        Ok(entry.update(&self.db).await?)
    }

    /// Deletes an estimate entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is accepted, the entry is not the
    /// contractor's, or the delete fails.
    pub async fn delete_estimate_entry(
        &self,
        contractor_id: Uuid,
        entry_id: Uuid,
    ) -> Result<(), EntryError> {
        let (entry, estimate) = self.owned_estimate_entry(contractor_id, entry_id).await?;
        EstimateService::ensure_editable(estimate.status.into())?;
        entry.delete(&self.db).await?;
        Ok(())
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Case-insensitive search over job entry and material descriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn search(
        &self,
        contractor_id: Uuid,
        query: &str,
        project_id: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<PageResponse<EntrySearchHit>, EntryError> {
        let page = page.normalized();

        let mut select = job_entries::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                job_entries::Relation::Parent.def(),
            )
            .filter(projects::Column::ContractorId.eq(contractor_id));

        if let Some(project_id) = project_id {
            select = select.filter(job_entries::Column::ProjectId.eq(project_id));
        }

        let query = query.trim();
        if !query.is_empty() {
            let pattern = like_pattern(query);
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::col((job_entries::Entity, job_entries::Column::Description))
                            .ilike(pattern.clone()),
                    )
                    .add(
                        Expr::col((job_entries::Entity, job_entries::Column::MaterialDescription))
                            .ilike(pattern),
                    ),
            );
        }

        let total = select.clone().count(&self.db).await?;

        let hits = select
            .select_only()
            .column(job_entries::Column::Id)
            .column(job_entries::Column::ProjectId)
            .column_as(projects::Column::Name, "project_name")
            .column(job_entries::Column::Date)
            .column(job_entries::Column::Description)
            .column(job_entries::Column::MaterialDescription)
            .column(job_entries::Column::Hours)
            .column(job_entries::Column::BillableAmount)
            .order_by_desc(job_entries::Column::Date)
            .order_by_desc(job_entries::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .into_model::<EntrySearchHit>()
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(hits, page.page, page.per_page, total))
    }

    // ========================================================================
    // Ownership helpers
    // ========================================================================

    async fn owned_project(&self, contractor_id: Uuid, project_id: Uuid) -> Result<projects::Model, EntryError> {
        projects::Entity::find_by_id(project_id)
            .filter(projects::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(EntryError::ProjectNotFound(project_id))
    }

    async fn owned_estimate(&self, contractor_id: Uuid, estimate_id: Uuid) -> Result<estimates::Model, EntryError> {
        estimates::Entity::find_by_id(estimate_id)
            .filter(estimates::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(EntryError::EstimateNotFound(estimate_id))
    }

    async fn owned_job_entry(&self, contractor_id: Uuid, entry_id: Uuid) -> Result<job_entries::Model, EntryError> {
        job_entries::Entity::find_by_id(entry_id)
            .inner_join(projects::Entity)
            .filter(projects::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(EntryError::EntryNotFound(entry_id))
    }

    async fn owned_estimate_entry(
        &self,
        contractor_id: Uuid,
        entry_id: Uuid,
    ) -> Result<(estimate_entries::Model, estimates::Model), EntryError> {
        let found = estimate_entries::Entity::find_by_id(entry_id)
            .find_also_related(estimates::Entity)
            .filter(estimates::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?;

        match found {
            Some((entry, Some(estimate))) => Ok((entry, estimate)),
            _ => Err(EntryError::EntryNotFound(entry_id)),
        }
    }
}

/// Escapes LIKE wildcards in user text and wraps it for a substring match.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn contractor(margin: Decimal) -> contractors::Model {
        let now = Utc::now().into();
        contractors::Model {
            id: Uuid::new_v4(),
            name: "Acme Excavation".to_string(),
            email: "office@acme.test".to_string(),
            phone: None,
            logo_url: None,
            material_margin: margin,
            created_at: now,
            updated_at: now,
        }
    }

    fn asset(contractor_id: Uuid) -> assets::Model {
        assets::Model {
            id: Uuid::new_v4(),
            contractor_id,
            name: "Excavator".to_string(),
            cost_rate: dec!(10),
            billable_rate: dec!(15),
            created_at: Utc::now().into(),
        }
    }

    fn material(contractor_id: Uuid) -> materials::Model {
        materials::Model {
            id: Uuid::new_v4(),
            contractor_id,
            description: "Gravel".to_string(),
            unit: "ton".to_string(),
            actual_cost: dec!(50),
            service_markup: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_contractor_margin_is_validated() {
        let stored = contractor(dec!(25));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let margin = contractor_margin(&db, stored.id).await.unwrap();

        assert_eq!(margin.percent(), dec!(25));
    }

    #[tokio::test]
    async fn test_contractor_margin_missing_contractor() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<contractors::Model>::new()])
            .into_connection();
        let id = Uuid::new_v4();

        let err = contractor_margin(&db, id).await.unwrap_err();

        assert!(matches!(err, EntryError::ContractorNotFound(found) if found == id));
    }

    #[tokio::test]
    async fn test_price_entry_uses_asset_and_material_template() {
        let contractor_id = Uuid::new_v4();
        let asset = asset(contractor_id);
        let material = material(contractor_id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![asset.clone()]])
            .append_query_results([vec![material.clone()]])
            .into_connection();

        let input = EntryInput {
            hours: dec!(5),
            asset_id: Some(asset.id),
            material_id: Some(material.id),
            description: "Base course".to_string(),
            ..EntryInput::default()
        };

        let priced = price_entry(&db, contractor_id, input, Margin::new(dec!(25)).unwrap())
            .await
            .unwrap();

        assert_eq!(priced.input.material_description.as_deref(), Some("Gravel"));
        assert_eq!(priced.input.material_unit.as_deref(), Some("ton"));
        assert_eq!(priced.input.material_cost, Some(dec!(50)));
        assert_eq!(priced.amounts.cost_amount, dec!(300.00));
        assert_eq!(priced.amounts.billable_amount, dec!(408.33));
    }

    #[tokio::test]
    async fn test_price_entry_rejects_foreign_asset() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<assets::Model>::new()])
            .into_connection();
        let asset_id = Uuid::new_v4();

        let input = EntryInput {
            hours: dec!(1),
            asset_id: Some(asset_id),
            ..EntryInput::default()
        };

        let err = price_entry(&db, Uuid::new_v4(), input, Margin::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, EntryError::AssetNotFound(id) if id == asset_id));
        assert_eq!(AppError::from(err).status_code(), 404);
    }

    #[tokio::test]
    async fn test_price_entry_rejects_negative_hours_before_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let input = EntryInput {
            hours: dec!(-2),
            ..EntryInput::default()
        };

        let err = price_entry(&db, Uuid::new_v4(), input, Margin::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, EntryError::Billing(BillingError::NegativeHours(_))));
        assert_eq!(AppError::from(err).status_code(), 400);
    }

    #[tokio::test]
    async fn test_price_entry_rejects_sub_cent_hours() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let input = EntryInput {
            hours: dec!(1.005),
            ..EntryInput::default()
        };

        let err = price_entry(&db, Uuid::new_v4(), input, Margin::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EntryError::Billing(BillingError::TooPrecise { field: "hours", .. })
        ));
        assert_eq!(AppError::from(err).status_code(), 400);
    }

    #[tokio::test]
    async fn test_price_entry_rejects_amounts_too_large_to_store() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let input = EntryInput {
            hours: dec!(1000),
            material_cost: Some(MAX_AMOUNT),
            ..EntryInput::default()
        };

        let err = price_entry(&db, Uuid::new_v4(), input, Margin::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EntryError::Billing(BillingError::TooLarge {
                field: "cost_amount",
                ..
            })
        ));
        assert_eq!(AppError::from(err).status_code(), 400);
    }

    #[tokio::test]
    async fn test_repricing_stored_entry_reproduces_amounts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let input = EntryInput {
            hours: dec!(2.25),
            material_cost: Some(dec!(3.33)),
            service_markup: Some(dec!(12.5)),
            ..EntryInput::default()
        };

        let first = price_entry(&db, Uuid::new_v4(), input, Margin::ZERO)
            .await
            .unwrap();
        let stored = EntryInput {
            hours: first.input.hours.round_dp(2),
            material_cost: first.input.material_cost.map(|c| c.round_dp(2)),
            service_markup: first.input.service_markup.map(|m| m.round_dp(2)),
            ..first.input.clone()
        };
        let second = price_entry(&db, Uuid::new_v4(), stored, Margin::ZERO)
            .await
            .unwrap();

        assert_eq!(first.amounts, second.amounts);
    }

    #[test]
    fn test_explicit_material_fields_win_over_template() {
        let mut input = EntryInput {
            material_description: Some("Crushed stone".to_string()),
            material_cost: Some(dec!(42)),
            service_markup: Some(dec!(10)),
            ..EntryInput::default()
        };

        apply_material_template(&mut input, material(Uuid::new_v4()));

        assert_eq!(input.material_description.as_deref(), Some("Crushed stone"));
        assert_eq!(input.material_unit.as_deref(), Some("ton"));
        assert_eq!(input.material_cost, Some(dec!(42)));
        assert_eq!(input.service_markup, Some(dec!(10)));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
