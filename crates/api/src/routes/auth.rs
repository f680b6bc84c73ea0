//! Login route.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::validate;
use crate::{AppState, error::ApiResult};
use jobledger_core::auth::verify_password;
use jobledger_db::UserRepository;
use jobledger_shared::AppError;

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Login request body.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email.
    #[validate(email)]
    pub email: String,
    /// Plain-text password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// Logged-in user.
    pub user_id: Uuid,
    /// Contractor the token is scoped to.
    pub contractor_id: Uuid,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

/// POST /auth/login - Authenticate user and return an access token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    validate(&payload)?;
    let user_repo = UserRepository::new((*state.db).clone());

    let Some(user) = user_repo
        .find_by_email(&payload.email)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
    else {
        info!(email = %payload.email, "Login attempt for non-existent user");
        return Err(invalid_credentials().into());
    };

    if !user.is_active {
        info!(user_id = %user.id, "Login attempt for disabled user");
        return Err(invalid_credentials().into());
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials().into());
    }

    let access_token =
        state
            .jwt_service
            .generate_access_token(user.id, user.contractor_id, &user.email)?;

    let response = LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.access_token_expires_in(),
        user_id: user.id,
        contractor_id: user.contractor_id,
    };

    user_repo
        .record_login(user)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!(user_id = %response.user_id, "User logged in successfully");

    Ok(Json(response))
}
