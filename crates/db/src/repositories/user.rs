//! Contractor user repository for login identities.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::contractor_users;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<contractor_users::Model>, DbErr> {
        contractor_users::Entity::find()
            .filter(contractor_users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<contractor_users::Model>, DbErr> {
        contractor_users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a login for a contractor. The email is stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        contractor_id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<contractor_users::Model, DbErr> {
        let user = contractor_users::ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_id: Set(contractor_id),
            email: Set(email.trim().to_lowercase()),
            password_hash: Set(password_hash.to_string()),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        user.insert(&self.db).await
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn record_login(&self, user: contractor_users::Model) -> Result<(), DbErr> {
        let mut user: contractor_users::ActiveModel = user.into();
        user.last_login_at = Set(Some(Utc::now().into()));
        user.update(&self.db).await?;
        Ok(())
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = contractor_users::Entity::find()
            .filter(contractor_users::Column::Email.eq(email.trim().to_lowercase()))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
