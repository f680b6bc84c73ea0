//! Refuses traffic while database migrations are pending.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{AppState, error::ApiError};
use jobledger_shared::AppError;

/// Migrations found unapplied when the server started.
#[derive(Debug, Clone, Default)]
pub struct SchemaStatus {
    pending: Arc<Vec<String>>,
}

impl SchemaStatus {
    /// Status with the given pending migration names.
    #[must_use]
    pub fn new(pending: Vec<String>) -> Self {
        Self {
            pending: Arc::new(pending),
        }
    }

    /// True when every migration has been applied.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pending.is_empty()
    }

    /// Names of the unapplied migrations.
    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.pending
    }
}

/// Answers 503 for every request while migrations are pending.
pub async fn schema_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.schema.is_ready() {
        return next.run(request).await;
    }

    ApiError(AppError::Unavailable(format!(
        "{} database migration(s) pending ({}); run the migrator and restart the server",
        state.schema.pending().len(),
        state.schema.pending().join(", ")
    )))
    .into_response()
}
