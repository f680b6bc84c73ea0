//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Authentication and schema-check middleware
//! - Error-to-response mapping
//! - PDF export of reports

pub mod error;
pub mod export;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use jobledger_shared::{EmailService, JwtService, ReportConfig};

pub use error::{ApiError, ApiResult};
pub use middleware::SchemaStatus;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Email service for sending estimates.
    pub email_service: Arc<EmailService>,
    /// Report rendering options.
    pub reports: Arc<ReportConfig>,
    /// Migrations still to be applied at startup.
    pub schema: SchemaStatus,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{AppState, SchemaStatus};
    use std::sync::Arc;

    use sea_orm::DatabaseConnection;

    use jobledger_shared::{EmailConfig, EmailService, JwtConfig, JwtService, ReportConfig};

    pub fn state(db: DatabaseConnection, pending: Vec<String>) -> AppState {
        AppState {
            db: Arc::new(db),
            jwt_service: Arc::new(JwtService::new(JwtConfig::default())),
            email_service: Arc::new(EmailService::new(EmailConfig::default())),
            reports: Arc::new(ReportConfig::default()),
            schema: SchemaStatus::new(pending),
        }
    }
}
