//! Auth orchestrator — signup, signin, logout, and refresh rotation.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use keyhub_core::error::{AppError, ErrorKind};
use keyhub_entity::token::TokenPair;
use keyhub_entity::user::CreateUser;
use keyhub_store::UserStore;

use crate::credential::CredentialHasher;
use crate::jwt::TokenIssuer;
use crate::session::SessionStore;

/// Implements the session state machine over its collaborators.
///
/// Per user the state is implicit in the stored fingerprint: `None` is
/// logged out, `Some(digest)` is logged in with exactly one valid refresh
/// token. Every operation follows verify → issue → persist, so a
/// persistence failure never commits tokens.
#[derive(Clone)]
pub struct AuthService {
    /// Password and fingerprint hasher.
    hasher: Arc<CredentialHasher>,
    /// Token pair issuer.
    issuer: Arc<TokenIssuer>,
    /// Fingerprint persistence.
    sessions: Arc<SessionStore>,
    /// User persistence.
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish()
    }
}

impl AuthService {
    /// Creates a new auth service with all required collaborators.
    pub fn new(
        hasher: Arc<CredentialHasher>,
        issuer: Arc<TokenIssuer>,
        sessions: Arc<SessionStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            hasher,
            issuer,
            sessions,
            users,
        }
    }

    /// Registers a new user and starts their first session.
    ///
    /// 1. Hash the password
    /// 2. Create the user record (email must be unused)
    /// 3. Issue a token pair
    /// 4. Persist the refresh-token fingerprint
    pub async fn signup(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let password_hash = self.hasher.hash(password)?;

        let user = self
            .users
            .create(&CreateUser {
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e.kind {
                ErrorKind::Conflict => AppError::invalid_credentials("Email is already registered"),
                _ => e,
            })?;

        let tokens = self.issuer.generate_token_pair(user.id, &user.email)?;
        self.sessions
            .set_fingerprint(user.id, Some(&tokens.refresh_token))
            .await?;

        info!(user_id = %user.id, "User signed up");
        Ok(tokens)
    }

    /// Authenticates an existing user and starts a fresh session,
    /// overwriting any prior fingerprint.
    pub async fn signin(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::invalid_credentials("User does not exist"))?;

        if !self.hasher.verify(&user.password_hash, password) {
            return Err(AppError::invalid_credentials("Password invalid"));
        }

        let tokens = self.issuer.generate_token_pair(user.id, &user.email)?;
        self.sessions
            .set_fingerprint(user.id, Some(&tokens.refresh_token))
            .await?;

        info!(user_id = %user.id, "User signed in");
        Ok(tokens)
    }

    /// Ends the user's session by clearing the stored fingerprint.
    ///
    /// Idempotent success: clearing an already-cleared fingerprint still
    /// reports `true`, and a missing user reports `false` rather than an
    /// error.
    pub async fn logout(&self, user_id: Uuid) -> Result<bool, AppError> {
        match self.sessions.set_fingerprint(user_id, None).await {
            Ok(()) => {
                info!(user_id = %user_id, "User logged out");
                Ok(true)
            }
            Err(e) if e.kind == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Exchanges a valid refresh token for a brand-new pair, invalidating
    /// the presented token.
    ///
    /// Every failure mode — unknown user, logged-out user, fingerprint
    /// mismatch, lost rotation race — collapses into the same
    /// `AccessDenied` so callers cannot probe session existence. The real
    /// reason is logged here instead.
    pub async fn rotate(
        &self,
        user_id: Uuid,
        presented_refresh_token: &str,
    ) -> Result<TokenPair, AppError> {
        let user = match self.users.find_by_id(user_id).await? {
            Some(user) => user,
            None => {
                warn!(user_id = %user_id, "Rotation denied: user does not exist");
                return Err(Self::denied());
            }
        };

        let Some(fingerprint) = user.refresh_token_fingerprint else {
            warn!(user_id = %user_id, "Rotation denied: no active session");
            return Err(Self::denied());
        };

        if !self.hasher.verify(&fingerprint, presented_refresh_token) {
            warn!(user_id = %user_id, "Rotation denied: fingerprint mismatch");
            return Err(Self::denied());
        }

        let tokens = self.issuer.generate_token_pair(user.id, &user.email)?;

        let swapped = self
            .sessions
            .rotate_fingerprint(user.id, &fingerprint, &tokens.refresh_token)
            .await
            .map_err(|e| match e.kind {
                // The record vanished between verify and persist.
                ErrorKind::NotFound => {
                    warn!(user_id = %user_id, "Rotation denied: user deleted mid-flight");
                    Self::denied()
                }
                _ => e,
            })?;

        if !swapped {
            warn!(user_id = %user_id, "Rotation denied: lost race to a concurrent rotation");
            return Err(Self::denied());
        }

        info!(user_id = %user.id, "Refresh token rotated");
        Ok(tokens)
    }

    /// The undifferentiated rotation failure surfaced to callers.
    fn denied() -> AppError {
        AppError::access_denied("Access denied")
    }
}
