//! Estimate repository: estimates, their lifecycle and conversion to projects.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use jobledger_core::estimate::{EstimateError, EstimateService, EstimateStatus};
use jobledger_core::reports::{EntryAmounts, ReportService, Totals};
use jobledger_shared::AppError;

use super::entry::{EntryError, EntryInput, contractor_margin, new_estimate_entry, price_entry};
use crate::entities::{estimate_entries, estimates, projects};

/// Error types for estimate operations.
#[derive(Debug, thiserror::Error)]
pub enum EstimateRepoError {
    /// Estimate not found for this contractor.
    #[error("Estimate not found: {0}")]
    NotFound(Uuid),

    /// Estimate name is blank.
    #[error("Estimate name is required")]
    MissingName,

    /// Lifecycle rule violation.
    #[error(transparent)]
    Rule(#[from] EstimateError),

    /// Repricing a copied entry failed.
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<EstimateRepoError> for AppError {
    fn from(err: EstimateRepoError) -> Self {
        match err {
            EstimateRepoError::NotFound(_) => Self::NotFound(err.to_string()),
            EstimateRepoError::MissingName => Self::invalid_field("name", "is required"),
            EstimateRepoError::Rule(e) => e.into(),
            EstimateRepoError::Entry(e) => e.into(),
            EstimateRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or replacing an estimate's header.
#[derive(Debug, Clone, Default)]
pub struct EstimateInput {
    /// Display name.
    pub name: String,
    /// Customer the estimate is for.
    pub customer_name: String,
    /// Where the estimate is emailed.
    pub customer_email: String,
    /// Notes shown to the customer.
    pub notes: String,
}

/// An estimate with its stored totals, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateSummary {
    /// The estimate.
    #[serde(flatten)]
    pub estimate: estimates::Model,
    /// Totals over its entries.
    pub totals: Totals,
}

/// Estimate repository.
#[derive(Debug, Clone)]
pub struct EstimateRepository {
    db: DatabaseConnection,
}

impl EstimateRepository {
    /// Creates a new estimate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a contractor's estimates, newest first, with totals.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list(&self, contractor_id: Uuid) -> Result<Vec<EstimateSummary>, EstimateRepoError> {
        let estimates = estimates::Entity::find()
            .filter(estimates::Column::ContractorId.eq(contractor_id))
            .order_by_desc(estimates::Column::CreatedAt)
            .all(&self.db)
            .await?;

        if estimates.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = estimates.iter().map(|e| e.id).collect();
        let entries = estimate_entries::Entity::find()
            .filter(estimate_entries::Column::EstimateId.is_in(ids))
            .all(&self.db)
            .await?;

        let mut amounts: HashMap<Uuid, Vec<EntryAmounts>> = HashMap::new();
        for entry in entries {
            amounts.entry(entry.estimate_id).or_default().push(EntryAmounts {
                cost_amount: entry.cost_amount,
                billable_amount: entry.billable_amount,
            });
        }

        Ok(estimates
            .into_iter()
            .map(|estimate| {
                let totals = amounts
                    .get(&estimate.id)
                    .map(|entries| ReportService::totals(entries))
                    .unwrap_or_default();
                EstimateSummary { estimate, totals }
            })
            .collect())
    }

    /// Finds one of the contractor's estimates.
    ///
    /// # Errors
    ///
    /// Returns `EstimateRepoError::NotFound` if the estimate does not exist or
    /// belongs to another contractor.
    pub async fn find(&self, contractor_id: Uuid, id: Uuid) -> Result<estimates::Model, EstimateRepoError> {
        find_owned(&self.db, contractor_id, id).await
    }

    /// Creates a draft estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the insert fails.
    pub async fn create(
        &self,
        contractor_id: Uuid,
        input: EstimateInput,
    ) -> Result<estimates::Model, EstimateRepoError> {
        let name = required_name(&input.name)?;
        let now = Utc::now().into();
        let estimate = estimates::ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_id: Set(contractor_id),
            name: Set(name),
            customer_name: Set(input.customer_name.trim().to_string()),
            customer_email: Set(input.customer_email.trim().to_string()),
            notes: Set(input.notes),
            status: Set(EstimateStatus::Draft.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let estimate = estimate.insert(&self.db).await?;
        tracing::info!(estimate_id = %estimate.id, contractor_id = %contractor_id, "Estimate created");
        Ok(estimate)
    }

    /// Replaces an estimate's header fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is accepted or not the contractor's,
    /// the name is blank, or the update fails.
    pub async fn update(
        &self,
        contractor_id: Uuid,
        id: Uuid,
        input: EstimateInput,
    ) -> Result<estimates::Model, EstimateRepoError> {
        let name = required_name(&input.name)?;
        let existing = find_owned(&self.db, contractor_id, id).await?;
        EstimateService::ensure_editable(existing.status.into())?;

        let mut estimate: estimates::ActiveModel = existing.into();
        estimate.name = Set(name);
        estimate.customer_name = Set(input.customer_name.trim().to_string());
        estimate.customer_email = Set(input.customer_email.trim().to_string());
        estimate.notes = Set(input.notes);
        estimate.updated_at = Set(Utc::now().into());
        Ok(estimate.update(&self.db).await?)
    }

    /// Deletes an estimate with its entries. A project created from it keeps
    /// existing with the link cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is not the contractor's or the delete fails.
    pub async fn delete(&self, contractor_id: Uuid, id: Uuid) -> Result<(), EstimateRepoError> {
        find_owned(&self.db, contractor_id, id)
            .await?
            .delete(&self.db)
            .await?;
        tracing::info!(estimate_id = %id, "Estimate deleted");
        Ok(())
    }

    /// Records that the estimate was emailed to the customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is accepted or not the contractor's,
    /// or the update fails.
    pub async fn mark_sent(&self, contractor_id: Uuid, id: Uuid) -> Result<estimates::Model, EstimateRepoError> {
        let existing = find_owned(&self.db, contractor_id, id).await?;
        let status = EstimateService::mark_sent(existing.status.into())?;

        let mut estimate: estimates::ActiveModel = existing.into();
        estimate.status = Set(status.into());
        estimate.updated_at = Set(Utc::now().into());
        Ok(estimate.update(&self.db).await?)
    }

    /// Copies an estimate into a new draft, repricing every entry against
    /// current rates and margin.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimate is not the contractor's, an entry
    /// cannot be repriced, or a write fails. Nothing is written on error.
    pub async fn duplicate(&self, contractor_id: Uuid, id: Uuid) -> Result<estimates::Model, EstimateRepoError> {
        let txn = self.db.begin().await?;

        let source = find_owned(&txn, contractor_id, id).await?;
        let entries = source
            .find_related(estimate_entries::Entity)
            .order_by_asc(estimate_entries::Column::CreatedAt)
            .all(&txn)
            .await?;
        let margin = contractor_margin(&txn, contractor_id).await?;

        let now = Utc::now().into();
        let copy = estimates::ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_id: Set(contractor_id),
            name: Set(EstimateService::copy_name(&source.name)),
            customer_name: Set(source.customer_name.clone()),
            customer_email: Set(source.customer_email.clone()),
            notes: Set(source.notes.clone()),
            status: Set(EstimateStatus::Draft.into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for entry in &entries {
            let priced =
                price_entry(&txn, contractor_id, EntryInput::from_estimate_entry(entry), margin).await?;
            new_estimate_entry(copy.id, priced).insert(&txn).await?;
        }

        txn.commit().await?;

        tracing::info!(
            source_id = %id,
            estimate_id = %copy.id,
            entries = entries.len(),
            "Estimate duplicated"
        );
        Ok(copy)
    }

    /// Accepts an estimate: creates a project named after it, links the two
    /// and marks the estimate accepted.
    ///
    /// # Errors
    ///
    /// Returns `EstimateError::AlreadyAccepted` (via `Rule`) on a second
    /// acceptance, or an error if the estimate is not the contractor's or a
    /// write fails. Nothing is written on error.
    pub async fn accept(
        &self,
        contractor_id: Uuid,
        id: Uuid,
        start_date: NaiveDate,
    ) -> Result<(estimates::Model, projects::Model), EstimateRepoError> {
        let txn = self.db.begin().await?;

        let existing = find_owned(&txn, contractor_id, id).await?;
        let status = EstimateService::accept(existing.status.into())?;

        let project = projects::ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_id: Set(contractor_id),
            name: Set(existing.name.clone()),
            start_date: Set(start_date),
            end_date: Set(None),
            estimate_id: Set(Some(existing.id)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let mut estimate: estimates::ActiveModel = existing.into();
        estimate.status = Set(status.into());
        estimate.updated_at = Set(Utc::now().into());
        let estimate = estimate.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(estimate_id = %id, project_id = %project.id, "Estimate accepted");
        Ok((estimate, project))
    }
}

async fn find_owned<C>(conn: &C, contractor_id: Uuid, id: Uuid) -> Result<estimates::Model, EstimateRepoError>
where
    C: ConnectionTrait,
{
    estimates::Entity::find_by_id(id)
        .filter(estimates::Column::ContractorId.eq(contractor_id))
        .one(conn)
        .await?
        .ok_or(EstimateRepoError::NotFound(id))
}

fn required_name(name: &str) -> Result<String, EstimateRepoError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EstimateRepoError::MissingName);
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::EstimateStatus as DbStatus;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn estimate_model(contractor_id: Uuid, status: DbStatus) -> estimates::Model {
        let now = Utc::now().into();
        estimates::Model {
            id: Uuid::new_v4(),
            contractor_id,
            name: "Barn pad".to_string(),
            customer_name: "Dana Ortiz".to_string(),
            customer_email: "dana@example.test".to_string(),
            notes: String::new(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn entry_model(
        estimate_id: Uuid,
        cost_amount: Option<Decimal>,
        billable_amount: Option<Decimal>,
    ) -> estimate_entries::Model {
        let now = Utc::now().into();
        estimate_entries::Model {
            id: Uuid::new_v4(),
            estimate_id,
            hours: dec!(4),
            asset_id: None,
            employee_id: None,
            material_id: None,
            material_description: None,
            material_unit: None,
            material_cost: None,
            service_markup: None,
            description: "Grading".to_string(),
            cost_amount,
            billable_amount,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_list_attaches_totals() {
        let contractor_id = Uuid::new_v4();
        let with_entries = estimate_model(contractor_id, DbStatus::Draft);
        let empty = estimate_model(contractor_id, DbStatus::Sent);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![with_entries.clone(), empty.clone()]])
            .append_query_results([vec![
                entry_model(with_entries.id, Some(dec!(100)), Some(dec!(150))),
                entry_model(with_entries.id, Some(dec!(20)), None),
            ]])
            .into_connection();

        let list = EstimateRepository::new(db).list(contractor_id).await.unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].totals.total_cost, dec!(120));
        assert_eq!(list[0].totals.total_billable, dec!(150));
        assert_eq!(list[0].totals.skipped, 1);
        assert_eq!(list[1].totals, Totals::default());
    }

    #[tokio::test]
    async fn test_update_accepted_estimate_is_read_only() {
        let contractor_id = Uuid::new_v4();
        let accepted = estimate_model(contractor_id, DbStatus::Accepted);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![accepted.clone()]])
            .into_connection();

        let err = EstimateRepository::new(db)
            .update(
                contractor_id,
                accepted.id,
                EstimateInput {
                    name: "Barn pad v2".to_string(),
                    ..EstimateInput::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EstimateRepoError::Rule(EstimateError::ReadOnly)));
        assert_eq!(AppError::from(err).status_code(), 422);
    }

    #[tokio::test]
    async fn test_accept_creates_linked_project() {
        let contractor_id = Uuid::new_v4();
        let sent = estimate_model(contractor_id, DbStatus::Sent);
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let project = projects::Model {
            id: Uuid::new_v4(),
            contractor_id,
            name: sent.name.clone(),
            start_date: start,
            end_date: None,
            estimate_id: Some(sent.id),
            created_at: Utc::now().into(),
        };
        let accepted = estimates::Model {
            status: DbStatus::Accepted,
            ..sent.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sent.clone()]])
            .append_query_results([vec![project.clone()]])
            .append_query_results([vec![accepted.clone()]])
            .into_connection();

        let (estimate, project) = EstimateRepository::new(db)
            .accept(contractor_id, sent.id, start)
            .await
            .unwrap();

        assert_eq!(estimate.status, DbStatus::Accepted);
        assert_eq!(project.estimate_id, Some(sent.id));
        assert_eq!(project.name, "Barn pad");
    }

    #[tokio::test]
    async fn test_accept_twice_is_a_business_rule_violation() {
        let contractor_id = Uuid::new_v4();
        let accepted = estimate_model(contractor_id, DbStatus::Accepted);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![accepted.clone()]])
            .into_connection();

        let err = EstimateRepository::new(db)
            .accept(contractor_id, accepted.id, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, EstimateRepoError::Rule(EstimateError::AlreadyAccepted)));
        assert_eq!(AppError::from(err).status_code(), 422);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = EstimateRepository::new(db)
            .create(Uuid::new_v4(), EstimateInput::default())
            .await
            .unwrap_err();

        assert_eq!(AppError::from(err).status_code(), 400);
    }
}
