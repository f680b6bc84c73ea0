//! Request middleware.

pub mod auth;
pub mod schema;

pub use auth::{AuthUser, auth_middleware};
pub use schema::{SchemaStatus, schema_guard};
