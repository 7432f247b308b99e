//! Session storage operations wrapping the user store.

use std::sync::Arc;

use uuid::Uuid;

use keyhub_core::error::AppError;
use keyhub_store::UserStore;

use crate::credential::CredentialHasher;

/// Persists and clears the refresh-token fingerprint for a user record.
///
/// Raw refresh tokens never reach the user store: a non-null token is
/// hashed here, and only its digest is written. One active fingerprint per
/// user at a time — every write overwrites the previous one.
#[derive(Clone)]
pub struct SessionStore {
    /// User persistence.
    users: Arc<dyn UserStore>,
    /// Fingerprint hasher.
    hasher: Arc<CredentialHasher>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish()
    }
}

impl SessionStore {
    /// Creates a new session store.
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    /// Overwrites the stored fingerprint with the hash of `refresh_token`;
    /// `None` clears it. Propagates `NotFound` when the user record does
    /// not exist.
    pub async fn set_fingerprint(
        &self,
        user_id: Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), AppError> {
        let digest = match refresh_token {
            Some(token) => Some(self.hasher.hash(token)?),
            None => None,
        };

        self.users.set_fingerprint(user_id, digest).await
    }

    /// Reads the stored fingerprint for a user.
    pub async fn get_fingerprint(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        self.users.get_fingerprint(user_id).await
    }

    /// Replaces the stored fingerprint with the hash of `new_refresh_token`
    /// only if it still equals `expected_digest`. Returns `false` when a
    /// concurrent rotation committed first.
    pub async fn rotate_fingerprint(
        &self,
        user_id: Uuid,
        expected_digest: &str,
        new_refresh_token: &str,
    ) -> Result<bool, AppError> {
        let digest = self.hasher.hash(new_refresh_token)?;
        self.users
            .replace_fingerprint(user_id, expected_digest, &digest)
            .await
    }
}
