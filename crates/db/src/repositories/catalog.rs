//! Catalog repository: assets, employees and material templates.
//!
//! Catalog rows are reference data. Editing a rate does not rewrite amounts
//! already stored on entries; deleting a row leaves entries in place with the
//! reference cleared.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use jobledger_core::billing::{MaterialUsage, Rates};
use jobledger_shared::AppError;

use crate::entities::{assets, employees, materials};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Asset not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(Uuid),

    /// Employee not found.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(Uuid),

    /// Material not found.
    #[error("Material not found: {0}")]
    MaterialNotFound(Uuid),

    /// Name or description is blank.
    #[error("{0} is required")]
    MissingName(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MissingName(field) => Self::invalid_field(field, "is required"),
            CatalogError::Database(e) => Self::Database(e.to_string()),
            not_found => Self::NotFound(not_found.to_string()),
        }
    }
}

/// Input for creating or replacing an asset or employee.
#[derive(Debug, Clone)]
pub struct RateSourceInput {
    /// Display name.
    pub name: String,
    /// Validated hourly rates.
    pub rates: Rates,
}

/// Input for creating or replacing a material template.
#[derive(Debug, Clone)]
pub struct MaterialInput {
    /// What the material is.
    pub description: String,
    /// Unit it is priced in (ton, yd, each).
    pub unit: String,
    /// Validated unit cost and optional markup.
    pub pricing: MaterialUsage,
}

/// Catalog repository.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Assets
    // ========================================================================

    /// Lists a contractor's assets by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_assets(&self, contractor_id: Uuid) -> Result<Vec<assets::Model>, CatalogError> {
        Ok(assets::Entity::find()
            .filter(assets::Column::ContractorId.eq(contractor_id))
            .order_by_asc(assets::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Creates an asset.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the insert fails.
    pub async fn create_asset(
        &self,
        contractor_id: Uuid,
        input: RateSourceInput,
    ) -> Result<assets::Model, CatalogError> {
        let name = required("name", &input.name)?;
        let asset = assets::ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_id: Set(contractor_id),
            name: Set(name),
            cost_rate: Set(input.rates.cost_rate),
            billable_rate: Set(input.rates.billable_rate),
            created_at: Set(Utc::now().into()),
        };
        Ok(asset.insert(&self.db).await?)
    }

    /// Replaces an asset's name and rates.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is not the contractor's or the update fails.
    pub async fn update_asset(
        &self,
        contractor_id: Uuid,
        id: Uuid,
        input: RateSourceInput,
    ) -> Result<assets::Model, CatalogError> {
        let name = required("name", &input.name)?;
        let mut asset: assets::ActiveModel = self.find_asset(contractor_id, id).await?.into();
        asset.name = Set(name);
        asset.cost_rate = Set(input.rates.cost_rate);
        asset.billable_rate = Set(input.rates.billable_rate);
        Ok(asset.update(&self.db).await?)
    }

    /// Deletes an asset; entries that used it keep their amounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is not the contractor's or the delete fails.
    pub async fn delete_asset(&self, contractor_id: Uuid, id: Uuid) -> Result<(), CatalogError> {
        self.find_asset(contractor_id, id).await?.delete(&self.db).await?;
        Ok(())
    }

    async fn find_asset(&self, contractor_id: Uuid, id: Uuid) -> Result<assets::Model, CatalogError> {
        assets::Entity::find_by_id(id)
            .filter(assets::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(CatalogError::AssetNotFound(id))
    }

    // ========================================================================
    // Employees
    // ========================================================================

    /// Lists a contractor's employees by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_employees(&self, contractor_id: Uuid) -> Result<Vec<employees::Model>, CatalogError> {
        Ok(employees::Entity::find()
            .filter(employees::Column::ContractorId.eq(contractor_id))
            .order_by_asc(employees::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Creates an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the insert fails.
    pub async fn create_employee(
        &self,
        contractor_id: Uuid,
        input: RateSourceInput,
    ) -> Result<employees::Model, CatalogError> {
        let name = required("name", &input.name)?;
        let employee = employees::ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_id: Set(contractor_id),
            name: Set(name),
            cost_rate: Set(input.rates.cost_rate),
            billable_rate: Set(input.rates.billable_rate),
            created_at: Set(Utc::now().into()),
        };
        Ok(employee.insert(&self.db).await?)
    }

    /// Replaces an employee's name and rates.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee is not the contractor's or the update fails.
    pub async fn update_employee(
        &self,
        contractor_id: Uuid,
        id: Uuid,
        input: RateSourceInput,
    ) -> Result<employees::Model, CatalogError> {
        let name = required("name", &input.name)?;
        let mut employee: employees::ActiveModel =
            self.find_employee(contractor_id, id).await?.into();
        employee.name = Set(name);
        employee.cost_rate = Set(input.rates.cost_rate);
        employee.billable_rate = Set(input.rates.billable_rate);
        Ok(employee.update(&self.db).await?)
    }

    /// Deletes an employee; entries that used them keep their amounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee is not the contractor's or the delete fails.
    pub async fn delete_employee(&self, contractor_id: Uuid, id: Uuid) -> Result<(), CatalogError> {
        self.find_employee(contractor_id, id)
            .await?
            .delete(&self.db)
            .await?;
        Ok(())
    }

    async fn find_employee(&self, contractor_id: Uuid, id: Uuid) -> Result<employees::Model, CatalogError> {
        employees::Entity::find_by_id(id)
            .filter(employees::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(CatalogError::EmployeeNotFound(id))
    }

    // ========================================================================
    // Materials
    // ========================================================================

    /// Lists a contractor's material templates by description.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_materials(&self, contractor_id: Uuid) -> Result<Vec<materials::Model>, CatalogError> {
        Ok(materials::Entity::find()
            .filter(materials::Column::ContractorId.eq(contractor_id))
            .order_by_asc(materials::Column::Description)
            .all(&self.db)
            .await?)
    }

    /// Creates a material template.
    ///
    /// # Errors
    ///
    /// Returns an error if the description is blank or the insert fails.
    pub async fn create_material(
        &self,
        contractor_id: Uuid,
        input: MaterialInput,
    ) -> Result<materials::Model, CatalogError> {
        let description = required("description", &input.description)?;
        let material = materials::ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_id: Set(contractor_id),
            description: Set(description),
            unit: Set(input.unit.trim().to_string()),
            actual_cost: Set(input.pricing.unit_cost),
            service_markup: Set(stored_markup(input.pricing.service_markup)),
            created_at: Set(Utc::now().into()),
        };
        Ok(material.insert(&self.db).await?)
    }

    /// Replaces a material template.
    ///
    /// # Errors
    ///
    /// Returns an error if the material is not the contractor's or the update fails.
    pub async fn update_material(
        &self,
        contractor_id: Uuid,
        id: Uuid,
        input: MaterialInput,
    ) -> Result<materials::Model, CatalogError> {
        let description = required("description", &input.description)?;
        let mut material: materials::ActiveModel =
            self.find_material(contractor_id, id).await?.into();
        material.description = Set(description);
        material.unit = Set(input.unit.trim().to_string());
        material.actual_cost = Set(input.pricing.unit_cost);
        material.service_markup = Set(stored_markup(input.pricing.service_markup));
        Ok(material.update(&self.db).await?)
    }

    /// Deletes a material template; entries keep their copied material fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the material is not the contractor's or the delete fails.
    pub async fn delete_material(&self, contractor_id: Uuid, id: Uuid) -> Result<(), CatalogError> {
        self.find_material(contractor_id, id)
            .await?
            .delete(&self.db)
            .await?;
        Ok(())
    }

    async fn find_material(&self, contractor_id: Uuid, id: Uuid) -> Result<materials::Model, CatalogError> {
        materials::Entity::find_by_id(id)
            .filter(materials::Column::ContractorId.eq(contractor_id))
            .one(&self.db)
            .await?
            .ok_or(CatalogError::MaterialNotFound(id))
    }
}

fn required(field: &'static str, value: &str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::MissingName(field));
    }
    Ok(trimmed.to_string())
}

/// A zero markup means "use the contractor margin"; store it as unset.
fn stored_markup(markup: Option<Decimal>) -> Option<Decimal> {
    markup.filter(|m| !m.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn asset_model(contractor_id: Uuid, name: &str) -> assets::Model {
        assets::Model {
            id: Uuid::new_v4(),
            contractor_id,
            name: name.to_string(),
            cost_rate: dec!(40),
            billable_rate: dec!(85),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_list_assets() {
        let contractor_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                asset_model(contractor_id, "Dozer"),
                asset_model(contractor_id, "Skid steer"),
            ]])
            .into_connection();

        let assets = CatalogRepository::new(db).list_assets(contractor_id).await.unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].name, "Dozer");
    }

    #[tokio::test]
    async fn test_create_asset_rejects_blank_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let input = RateSourceInput {
            name: "   ".to_string(),
            rates: Rates::new(dec!(1), dec!(2)).unwrap(),
        };

        let err = CatalogRepository::new(db)
            .create_asset(Uuid::new_v4(), input)
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::MissingName("name")));
        assert_eq!(AppError::from(err).status_code(), 400);
    }

    #[tokio::test]
    async fn test_delete_foreign_asset_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<assets::Model>::new()])
            .into_connection();

        let err = CatalogRepository::new(db)
            .delete_asset(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert_eq!(AppError::from(err).status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete_asset() {
        let contractor_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![asset_model(contractor_id, "Trencher")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let result = CatalogRepository::new(db)
            .delete_asset(contractor_id, Uuid::new_v4())
            .await;

        assert!(result.is_ok());
    }

    #[test]
    fn test_zero_markup_is_stored_as_unset() {
        assert_eq!(stored_markup(Some(dec!(0))), None);
        assert_eq!(stored_markup(Some(dec!(15))), Some(dec!(15)));
        assert_eq!(stored_markup(None), None);
    }
}
