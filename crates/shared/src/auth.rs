//! JWT claims for authenticated contractor users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
///
/// Every token is bound to exactly one contractor; all data access is scoped
/// to `ctr`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (contractor user ID).
    pub sub: Uuid,
    /// Contractor (tenant) ID.
    pub ctr: Uuid,
    /// Login email, kept for log context.
    pub email: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a contractor user.
    #[must_use]
    pub fn new(user_id: Uuid, contractor_id: Uuid, email: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            ctr: contractor_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the contractor ID from claims.
    #[must_use]
    pub const fn contractor_id(&self) -> Uuid {
        self.ctr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let user_id = Uuid::new_v4();
        let contractor_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(user_id, contractor_id, "crew@example.com", expires_at);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.contractor_id(), contractor_id);
        assert_eq!(claims.email, "crew@example.com");
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }
}
