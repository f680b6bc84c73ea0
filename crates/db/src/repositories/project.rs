//! Project repository: projects and the payments recorded against them.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use jobledger_shared::AppError;
use jobledger_core::billing::MAX_AMOUNT;

use crate::entities::{payments, projects};

/// Error types for project operations.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// Project not found for this contractor.
    #[error("Project not found: {0}")]
    NotFound(Uuid),

    /// Payment not found for this contractor.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Project name is blank.
    #[error("Project name is required")]
    MissingName,

    /// End date precedes start date.
    #[error("End date {end} is before start date {start}")]
    EndBeforeStart {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Payment amount is zero or negative.
    #[error("Payment amount must be positive, got {0}")]
    NonPositivePayment(Decimal),

    /// Payment amount does not fit `NUMERIC(12, 2)`.
    #[error("Payment amount must be at most {max}, got {value}")]
    PaymentTooLarge {
        /// Supplied amount.
        value: Decimal,
        /// Largest accepted amount.
        max: Decimal,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ProjectError> for AppError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(_) | ProjectError::PaymentNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            ProjectError::MissingName => Self::invalid_field("name", "is required"),
            ProjectError::EndBeforeStart { .. } => Self::invalid_field("end_date", err),
            ProjectError::NonPositivePayment(_) | ProjectError::PaymentTooLarge { .. } => {
                Self::invalid_field("amount", err)
            }
            ProjectError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating or replacing a project.
#[derive(Debug, Clone)]
pub struct ProjectInput {
    /// Display name.
    pub name: String,
    /// First day of work.
    pub start_date: NaiveDate,
    /// Last day of work, once finished.
    pub end_date: Option<NaiveDate>,
}

impl ProjectInput {
    fn validate(&self) -> Result<String, ProjectError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProjectError::MissingName);
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ProjectError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }
        Ok(name.to_string())
    }
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// Amount received.
    pub amount: Decimal,
    /// Day it was received.
    pub date: NaiveDate,
    /// Free-text notes (check number, method).
    pub notes: String,
}

/// Project repository.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Creates a new project repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a contractor's projects, newest start date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, contractor_id: Uuid) -> Result<Vec<projects::Model>, ProjectError> {
        Ok(projects::Entity::find()
            .filter(projects::Column::ContractorId.eq(contractor_id))
            .order_by_desc(projects::Column::StartDate)
            .order_by_asc(projects::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds one of the contractor's projects.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::NotFound` if the project does not exist or
    /// belongs to another contractor.
    pub async fn find(&self, contractor_id: Uuid, id: Uuid) -> Result<projects::Model, ProjectError> {
        projects::Entity::find_by_id(id)
            .filter(projects::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(ProjectError::NotFound(id))
    }

    /// Finds the project created by accepting an estimate, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_estimate(
        &self,
        contractor_id: Uuid,
        estimate_id: Uuid,
    ) -> Result<Option<projects::Model>, ProjectError> {
        Ok(projects::Entity::find()
            .filter(projects::Column::ContractorId.eq(contractor_id))
            .filter(projects::Column::EstimateId.eq(estimate_id))
            .one(&self.db)
            .await?)
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or the insert fails.
    pub async fn create(&self, contractor_id: Uuid, input: ProjectInput) -> Result<projects::Model, ProjectError> {
        let name = input.validate()?;
        let project = projects::ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_id: Set(contractor_id),
            name: Set(name),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            estimate_id: Set(None),
            created_at: Set(Utc::now().into()),
        };
        let project = project.insert(&self.db).await?;
        tracing::info!(project_id = %project.id, contractor_id = %contractor_id, "Project created");
        Ok(project)
    }

    /// Replaces a project's name and dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not the contractor's, the input is
    /// invalid, or the update fails.
    pub async fn update(
        &self,
        contractor_id: Uuid,
        id: Uuid,
        input: ProjectInput,
    ) -> Result<projects::Model, ProjectError> {
        let name = input.validate()?;
        let mut project: projects::ActiveModel = self.find(contractor_id, id).await?.into();
        project.name = Set(name);
        project.start_date = Set(input.start_date);
        project.end_date = Set(input.end_date);
        Ok(project.update(&self.db).await?)
    }

    /// Deletes a project with its entries and payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not the contractor's or the delete fails.
    pub async fn delete(&self, contractor_id: Uuid, id: Uuid) -> Result<(), ProjectError> {
        self.find(contractor_id, id).await?.delete(&self.db).await?;
        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }

    // ========================================================================
    // Payments
    // ========================================================================

    /// Lists a project's payments in date order.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not the contractor's or the query fails.
    pub async fn payments(&self, contractor_id: Uuid, project_id: Uuid) -> Result<Vec<payments::Model>, ProjectError> {
        self.find(contractor_id, project_id).await?;
        Ok(payments::Entity::find()
            .filter(payments::Column::ProjectId.eq(project_id))
            .order_by_asc(payments::Column::Date)
            .order_by_asc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Records a payment against a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the project is not the
    /// contractor's, or the insert fails.
    pub async fn add_payment(
        &self,
        contractor_id: Uuid,
        project_id: Uuid,
        input: PaymentInput,
    ) -> Result<payments::Model, ProjectError> {
        if input.amount <= Decimal::ZERO {
            return Err(ProjectError::NonPositivePayment(input.amount));
        }
        if input.amount > MAX_AMOUNT {
            return Err(ProjectError::PaymentTooLarge {
                value: input.amount,
                max: MAX_AMOUNT,
            });
        }
        self.find(contractor_id, project_id).await?;

        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            amount: Set(input.amount),
            date: Set(input.date),
            notes: Set(input.notes.trim().to_string()),
            created_at: Set(Utc::now().into()),
        };
        let payment = payment.insert(&self.db).await?;
        tracing::info!(
            payment_id = %payment.id,
            project_id = %project_id,
            amount = %payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Deletes a payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is not the contractor's or the delete fails.
    pub async fn delete_payment(&self, contractor_id: Uuid, payment_id: Uuid) -> Result<(), ProjectError> {
        let payment = payments::Entity::find_by_id(payment_id)
            .inner_join(projects::Entity)
            .filter(projects::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(ProjectError::PaymentNotFound(payment_id))?;
        payment.delete(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project_model(contractor_id: Uuid) -> projects::Model {
        projects::Model {
            id: Uuid::new_v4(),
            contractor_id,
            name: "Miller driveway".to_string(),
            start_date: date(2025, 4, 1),
            end_date: None,
            estimate_id: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_project() {
        let contractor_id = Uuid::new_v4();
        let stored = project_model(contractor_id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let project = ProjectRepository::new(db)
            .create(
                contractor_id,
                ProjectInput {
                    name: "  Miller driveway ".to_string(),
                    start_date: date(2025, 4, 1),
                    end_date: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(project.name, "Miller driveway");
    }

    #[tokio::test]
    async fn test_end_before_start_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = ProjectRepository::new(db)
            .create(
                Uuid::new_v4(),
                ProjectInput {
                    name: "Pond".to_string(),
                    start_date: date(2025, 5, 10),
                    end_date: Some(date(2025, 5, 1)),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProjectError::EndBeforeStart { .. }));
        assert_eq!(AppError::from(err).status_code(), 400);
    }

    #[tokio::test]
    async fn test_foreign_project_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<projects::Model>::new()])
            .into_connection();
        let id = Uuid::new_v4();

        let err = ProjectRepository::new(db)
            .find(Uuid::new_v4(), id)
            .await
            .unwrap_err();

        assert!(matches!(err, ProjectError::NotFound(found) if found == id));
        assert_eq!(AppError::from(err).status_code(), 404);
    }

    #[tokio::test]
    async fn test_zero_payment_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = ProjectRepository::new(db)
            .add_payment(
                Uuid::new_v4(),
                Uuid::new_v4(),
                PaymentInput {
                    amount: dec!(0),
                    date: date(2025, 4, 2),
                    notes: String::new(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProjectError::NonPositivePayment(_)));
    }

    #[tokio::test]
    async fn test_oversized_payment_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = ProjectRepository::new(db)
            .add_payment(
                Uuid::new_v4(),
                Uuid::new_v4(),
                PaymentInput {
                    amount: Decimal::MAX,
                    date: date(2025, 4, 2),
                    notes: String::new(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProjectError::PaymentTooLarge { .. }));
        assert_eq!(AppError::from(err).status_code(), 400);
    }

    #[tokio::test]
    async fn test_add_payment() {
        let contractor_id = Uuid::new_v4();
        let project = project_model(contractor_id);
        let payment = payments::Model {
            id: Uuid::new_v4(),
            project_id: project.id,
            amount: dec!(500.00),
            date: date(2025, 4, 3),
            notes: "Check 1042".to_string(),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![project.clone()]])
            .append_query_results([vec![payment.clone()]])
            .into_connection();

        let stored = ProjectRepository::new(db)
            .add_payment(
                contractor_id,
                project.id,
                PaymentInput {
                    amount: dec!(500.00),
                    date: date(2025, 4, 3),
                    notes: " Check 1042 ".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(stored.amount, dec!(500.00));
        assert_eq!(stored.project_id, project.id);
    }
}
