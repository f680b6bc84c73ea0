//! Contractor repository for tenant profile operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use jobledger_core::billing::{BillingError, Margin};
use jobledger_shared::AppError;

use crate::entities::contractors;

/// Error types for contractor operations.
#[derive(Debug, thiserror::Error)]
pub enum ContractorError {
    /// Contractor not found.
    #[error("Contractor not found: {0}")]
    NotFound(Uuid),

    /// Email already registered.
    #[error("Contractor email already registered: {0}")]
    DuplicateEmail(String),

    /// Stored margin violates `0 <= margin < 100`.
    #[error("Stored material margin is invalid: {0}")]
    InvalidMargin(#[from] BillingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ContractorError> for AppError {
    fn from(err: ContractorError) -> Self {
        match err {
            ContractorError::NotFound(_) => Self::NotFound(err.to_string()),
            ContractorError::DuplicateEmail(_) => Self::Conflict(err.to_string()),
            ContractorError::InvalidMargin(_) => Self::Internal(err.to_string()),
            ContractorError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a contractor.
#[derive(Debug, Clone)]
pub struct CreateContractorInput {
    /// Business name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Material margin.
    pub material_margin: Margin,
}

/// Input for updating a contractor's profile.
#[derive(Debug, Clone)]
pub struct UpdateContractorInput {
    /// Business name.
    pub name: Option<String>,
    /// Phone number; `Some(None)` clears it.
    pub phone: Option<Option<String>>,
    /// Logo URL; `Some(None)` clears it.
    pub logo_url: Option<Option<String>>,
    /// Material margin.
    pub material_margin: Option<Margin>,
}

/// Contractor repository.
#[derive(Debug, Clone)]
pub struct ContractorRepository {
    db: DatabaseConnection,
}

impl ContractorRepository {
    /// Creates a new contractor repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a contractor by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such contractor exists.
    pub async fn find_by_id(&self, id: Uuid) -> Result<contractors::Model, ContractorError> {
        contractors::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ContractorError::NotFound(id))
    }

    /// Creates a contractor.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` if the email is taken, or a database error.
    pub async fn create(&self, input: CreateContractorInput) -> Result<contractors::Model, ContractorError> {
        let exists = contractors::Entity::find()
            .filter(contractors::Column::Email.eq(&input.email))
            .count(&self.db)
            .await?
            > 0;
        if exists {
            return Err(ContractorError::DuplicateEmail(input.email));
        }

        let now = Utc::now().into();
        let contractor = contractors::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            logo_url: Set(None),
            material_margin: Set(input.material_margin.percent()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(contractor.insert(&self.db).await?)
    }

    /// Updates the contractor's profile. Unset fields are left unchanged.
    ///
    /// Changing the margin does not touch amounts stored on existing entries.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such contractor exists, or a database error.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateContractorInput,
    ) -> Result<contractors::Model, ContractorError> {
        let existing = self.find_by_id(id).await?;
        let mut contractor: contractors::ActiveModel = existing.into();

        if let Some(name) = input.name {
            contractor.name = Set(name);
        }
        if let Some(phone) = input.phone {
            contractor.phone = Set(phone);
        }
        if let Some(logo_url) = input.logo_url {
            contractor.logo_url = Set(logo_url);
        }
        if let Some(margin) = input.material_margin {
            contractor.material_margin = Set(margin.percent());
        }
        contractor.updated_at = Set(Utc::now().into());

        let updated = contractor.update(&self.db).await?;
        tracing::info!(contractor_id = %id, margin = %updated.material_margin, "Contractor updated");
        Ok(updated)
    }

    /// Returns the contractor's validated material margin.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such contractor exists, `InvalidMargin` if the
    /// stored value is out of range, or a database error.
    pub async fn margin(&self, id: Uuid) -> Result<Margin, ContractorError> {
        let contractor = self.find_by_id(id).await?;
        Ok(Margin::new(contractor.material_margin)?)
    }
}
