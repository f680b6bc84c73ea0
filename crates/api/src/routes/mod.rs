//! API route definitions.

use axum::{Router, middleware};
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::{auth_middleware, schema_guard};
use crate::AppState;
use jobledger_shared::AppError;

pub mod auth;
pub mod catalog;
pub mod contractor;
pub mod dashboard;
pub mod entries;
pub mod estimates;
pub mod health;
pub mod projects;
pub mod reports;
pub mod search;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(contractor::routes())
        .merge(catalog::routes())
        .merge(dashboard::routes())
        .merge(projects::routes())
        .merge(entries::routes())
        .merge(estimates::routes())
        .merge(reports::routes())
        .merge(search::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state, schema_guard))
}

/// Runs `validator` rules on a request body.
pub(crate) fn validate<T: Validate>(request: &T) -> Result<(), ApiError> {
    request
        .validate()
        .map_err(|e| ApiError(AppError::Validation(e.to_string())))
}
