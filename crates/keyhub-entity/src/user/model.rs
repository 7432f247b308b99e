//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user in the KeyHub system.
///
/// The session state machine is implicit in `refresh_token_fingerprint`:
/// `None` means logged out, `Some(digest)` means logged in with exactly one
/// valid refresh token whose argon2 digest is stored here. The raw refresh
/// token is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Email address (unique, case-insensitive).
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Argon2 digest of the currently valid refresh token, if any.
    #[serde(skip_serializing)]
    pub refresh_token_fingerprint: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check whether the user currently holds an active session.
    pub fn is_logged_in(&self) -> bool {
        self.refresh_token_fingerprint.is_some()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
}

/// Data for updating an existing user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    /// The user ID to update.
    pub id: Uuid,
    /// New email address.
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(fingerprint: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "example@test.com".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            refresh_token_fingerprint: fingerprint.map(String::from),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_logged_in_state_follows_fingerprint() {
        assert!(!user(None).is_logged_in());
        assert!(user(Some("$argon2id$digest")).is_logged_in());
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let json = serde_json::to_value(user(Some("$argon2id$digest"))).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token_fingerprint").is_none());
        assert!(json.get("email").is_some());
    }
}
